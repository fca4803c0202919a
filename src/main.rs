mod directed;

mod body;
mod err;
mod http;
mod opt;
mod tcp;

#[tokio::main]
async fn main() -> Result<(), err::DisplayError> {
    let options: opt::Options = clap::Parser::parse();

    env_logger::Builder::new()
        .filter_level(match options.verbose {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        })
        .init();

    directed::main(options).await?;

    Ok(())
}
