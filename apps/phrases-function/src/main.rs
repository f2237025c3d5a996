use std::io;

use phrases_core::{NotionStore, PhrasesConfig};
use phrases_facade::Reply;
use tracing::error;

mod cgi;

use cgi::{CgiEnv, CgiResponder};

fn main() {
    phrases_otel::init_stderr();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(err) => {
            eprintln!("error: failed to start runtime: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = runtime.block_on(run()) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

async fn run() -> io::Result<()> {
    let env = CgiEnv::from_env();
    let body = env.read_body(io::stdin().lock())?;
    let stdout = io::stdout().lock();

    let store = match PhrasesConfig::from_env()
        .map_err(|err| err.to_string())
        .and_then(|config| NotionStore::new(config).map_err(|err| err.to_string()))
    {
        Ok(store) => store,
        Err(message) => {
            error!(target: "phrases::function", %message, "store setup failed");
            return Reply::error(500, message).send(CgiResponder::new(stdout));
        }
    };

    cgi::invoke(&store, &env, &body, stdout).await
}
