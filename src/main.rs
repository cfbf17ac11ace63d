use clap::Parser;

fn main() -> miette::Result<()> {
    let app = graphme::App::parse();
    app.init_logger()?;
    app.run()
}
