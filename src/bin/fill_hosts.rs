use clap::Parser;

use lazy_lxd::host_registration::helper::{run, HelperArgs};

fn main() {
    let args = HelperArgs::parse();
    std::process::exit(run(&args));
}
