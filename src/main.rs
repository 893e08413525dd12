use std::process::ExitCode;

use clap::Parser;

use pwa_devserver::{conf, server};

/// Dev server for PWA testing: static files plus mock usage API.
#[derive(Parser, Debug)]
struct Cli {
    /// `PORT` or `--port PORT`. Bad or missing values mean the default.
    #[clap(
        value_name = "ARGS",
        num_args = 0..,
        allow_hyphen_values = true,
        trailing_var_arg = true
    )]
    args: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    human_panic_setup();
    let cli = Cli::parse();
    let port = conf::port_from_args(&cli.args);
    let conf = conf::Conf::with_port(port);
    pwa_devserver::tracing::init(conf.log_level)?;
    tracing::debug!(?cli, "Starting.");
    print_banner(port);
    match server::run(&conf).await {
        Ok(()) => {
            println!();
            println!("🛑 Server stopped");
            Ok(ExitCode::SUCCESS)
        }
        Err(error) if server::is_addr_in_use(&error) => {
            tracing::debug!(?error, "Bind failed.");
            println!("❌ Port {port} already in use. Try a different port.");
            println!(
                "   {} --port {}",
                env!("CARGO_PKG_NAME"),
                port.saturating_add(1)
            );
            Ok(ExitCode::FAILURE)
        }
        Err(error) => {
            println!("❌ Server error: {error:#}");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_banner(port: u16) {
    let rule = "=========================================";
    println!("🚀 Usage Monitor - Test Server");
    println!("{rule}");
    println!("📍 Server starting on port {port}");
    println!("🌐 Open: http://localhost:{port}");
    println!("📱 Mobile: http://[your-ip]:{port}");
    println!();
    println!("🔧 Features enabled:");
    for feature in [
        "PWA manifest support",
        "Service Worker compatibility",
        "Mock API endpoints",
        "CORS headers for testing",
        "Proper MIME types",
    ] {
        println!("   ✅ {feature}");
    }
    println!();
    println!("📋 Test endpoints:");
    println!("   GET  /api/usage    - Mock usage data");
    println!("   GET  /api/validate - API key validation");
    println!();
    println!("Press Ctrl+C to stop");
    println!("{rule}");
}

fn human_panic_setup() {
    macro_rules! repo {
        () => {
            env!("CARGO_PKG_REPOSITORY")
        };
    }
    human_panic::setup_panic!(human_panic::Metadata::new(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    )
    .authors(env!("CARGO_PKG_AUTHORS"))
    .homepage(repo!())
    .support(concat!("- Submit an issue at ", repo!(), "/issues")));
}
