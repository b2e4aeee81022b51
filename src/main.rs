use std::io;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let code = dspbench::run(&args, &mut io::stdout().lock(), &mut io::stderr().lock());
    std::process::exit(code);
}
