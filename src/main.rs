use spa_rewrite::invoke_server::InvokeServer;
use spa_rewrite::rewrite_app::parse_command_line;
use spa_rewrite::rewrite_config::InvocationMode;
use spa_rewrite::Rewriter;

#[tokio::main]
pub async fn main() -> anyhow::Result<()> {
    let configuration = parse_command_line()?;
    let rewriter = Rewriter::new(configuration.rewrite);

    match configuration.mode {
        InvocationMode::Serve(http) => InvokeServer::new(&http, rewriter).serve().await,
        InvocationMode::Stdin => {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            spa_rewrite::event::invoke(&rewriter, stdin.lock(), stdout.lock())
        }
    }
}
