use std::env;
use std::ffi::OsString;
use std::process::{Command, exit};

fn main() {
    let args: Vec<OsString> = env::args_os().skip(1).collect();

    let status = match Command::new("branch-deploy").args(&args).status() {
        Ok(status) => status,
        Err(err) => {
            eprintln!("Failed to invoke branch-deploy: {err}");
            exit(1);
        }
    };

    exit(status.code().unwrap_or(1));
}
