extern crate clap;

mod cmd_mcst;

fn main() -> anyhow::Result<()> {
    let matches = cmd_mcst::make_command().get_matches();
    cmd_mcst::execute(&matches)
}
