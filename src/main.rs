use std::env;
use std::process;

use tokre::Substitutions;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    match run(&args) {
        Ok(matched) => process::exit(if matched { 0 } else { 1 }),
        Err(message) => {
            eprintln!("{}", message);
            process::exit(2);
        }
    }
}

fn run(args: &[String]) -> Result<bool, String> {
    let (want_dot, rest) = match args.first().map(String::as_str) {
        Some("--dot") => (true, &args[1..]),
        _ => (false, &args[..]),
    };

    if want_dot {
        let [pattern] = rest else {
            return Err(String::from("usage: tokre --dot <pattern>"));
        };
        let regex = Substitutions::new()
            .compile(pattern)
            .map_err(|err| err.to_string())?;
        print!("{}", regex.machine().to_dot(pattern));
        return Ok(true);
    }

    let [pattern, input] = rest else {
        return Err(String::from("usage: tokre [--dot] <pattern> [<input>]"));
    };
    let regex = Substitutions::new()
        .compile(pattern)
        .map_err(|err| err.to_string())?;

    let matched = regex.is_match(input);
    println!(
        "/{}/ on {:?}: {}",
        pattern,
        input,
        if matched { "match" } else { "no match" }
    );
    Ok(matched)
}
