// src/bin/estoque_admin.rs

use std::io::{self, BufRead, Write};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use estoque::{AppState, Config};

#[derive(Parser)]
#[command(
    name = "estoque-admin",
    version,
    about = "Tarefas administrativas do controle de estoque"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Remove todos os movimentos sem alterar as quantidades dos materiais
    #[command(name = "clear-movimentos")]
    ClearMovimentos {
        /// Confirma a operação sem perguntar
        #[arg(long = "yes", default_value_t = false)]
        yes: bool,

        /// Usa um único DELETE em massa (mais rápido)
        #[arg(long = "fast", default_value_t = false)]
        fast: bool,
    },

    /// Cria um usuário e imprime o token de acesso
    #[command(name = "create-user")]
    CreateUser {
        #[arg(long = "username", short = 'u')]
        username: String,

        /// Usuário da equipe (pode remover materiais)
        #[arg(long = "staff", default_value_t = false)]
        staff: bool,
    },

    /// Emite um novo token para um usuário existente
    #[command(name = "issue-token")]
    IssueToken {
        #[arg(long = "username", short = 'u')]
        username: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let app_state = AppState::new(&config).await?;

    sqlx::migrate!().run(&app_state.db_pool).await?;

    match cli.command {
        Command::ClearMovimentos { yes, fast } => clear_movimentos(&app_state, yes, fast).await,
        Command::CreateUser { username, staff } => {
            let (user, token) = app_state.auth_service.create_user(&username, staff).await?;
            println!("Usuário criado: {} ({})", user.username, user.id);
            println!("{token}");
            Ok(())
        }
        Command::IssueToken { username } => {
            let token = app_state.auth_service.issue_token(&username).await?;
            println!("{token}");
            Ok(())
        }
    }
}

async fn clear_movimentos(app_state: &AppState, yes: bool, fast: bool) -> anyhow::Result<()> {
    let total = app_state
        .movimento_service
        .count_movimentos(&app_state.db_pool)
        .await?;

    if total == 0 {
        println!("Nenhum movimento para remover.");
        return Ok(());
    }

    if !yes {
        println!("Isto irá remover {total} movimentos e NÃO alterará as quantidades dos materiais.");
        if !confirm("Digite 'SIM' para confirmar: ")? {
            println!("Operação cancelada.");
            return Ok(());
        }
    }

    let removidos = app_state
        .movimento_service
        .clear_movimentos(&app_state.db_pool, fast)
        .await?;

    if fast {
        println!("Movimentos removidos (método rápido): {removidos}");
    } else {
        println!("Movimentos removidos: {removidos}");
    }
    Ok(())
}

fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut resposta = String::new();
    io::stdin().lock().read_line(&mut resposta)?;
    Ok(is_confirmation(&resposta))
}

fn is_confirmation(resposta: &str) -> bool {
    resposta.trim().eq_ignore_ascii_case("SIM")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_movimentos_aceita_as_flags() {
        let cli = Cli::try_parse_from(["estoque-admin", "clear-movimentos", "--yes", "--fast"]).unwrap();
        assert!(matches!(cli.command, Command::ClearMovimentos { yes: true, fast: true }));
    }

    #[test]
    fn clear_movimentos_pergunta_por_padrao() {
        let cli = Cli::try_parse_from(["estoque-admin", "clear-movimentos"]).unwrap();
        assert!(matches!(cli.command, Command::ClearMovimentos { yes: false, fast: false }));
    }

    #[test]
    fn create_user_exige_username() {
        assert!(Cli::try_parse_from(["estoque-admin", "create-user"]).is_err());

        let cli = Cli::try_parse_from(["estoque-admin", "create-user", "-u", "ana", "--staff"]).unwrap();
        match cli.command {
            Command::CreateUser { username, staff } => {
                assert_eq!(username, "ana");
                assert!(staff);
            }
            _ => panic!("esperava create-user"),
        }
    }

    #[test]
    fn comando_desconhecido_e_rejeitado() {
        assert!(Cli::try_parse_from(["estoque-admin", "serve"]).is_err());
    }

    #[test]
    fn confirmacao_ignora_caixa_e_espacos() {
        assert!(is_confirmation("sim\n"));
        assert!(is_confirmation("  SIM "));
        assert!(!is_confirmation("s"));
        assert!(!is_confirmation(""));
    }
}
