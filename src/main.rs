use clap::Parser;
use waywedo_client::config::cli::{CliConfig, Operation};
use waywedo_client::utils::{logger, validation::Validate};
use waywedo_client::{WayWeDoClient, WwdError};

/// 執行單一操作，回傳要輸出的內容與是否成功
async fn run(client: &WayWeDoClient, operation: Operation) -> Result<(String, bool), WwdError> {
    let body = match operation {
        Operation::ListProcedures(filter) => client.list_procedures(&filter).await?,
        Operation::ListTaskInstances(filter) => client.list_task_instances(&filter).await?,
        Operation::ListUsers(filter) => client.list_users(&filter).await?,
        Operation::CreateUser(user) => client.create_user(&user).await?,
        Operation::UpdateUser(id, update) => {
            if update.is_empty() {
                tracing::warn!("No fields given for user {}, sending an empty update", id);
            }
            client.update_user(id, &update).await?
        }
        Operation::CreateInvitation(invitation) => client.create_invitation(&invitation).await?,
        Operation::DeleteUser(id) => {
            let status = client.delete_user(id).await?;
            return Ok((status.to_string(), (200..300).contains(&status)));
        }
        Operation::DeleteTeamUser(id) => {
            let status = client.delete_team_user(id).await?;
            return Ok((status.to_string(), (200..300).contains(&status)));
        }
    };

    Ok((serde_json::to_string_pretty(&body)?, true))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    let config = match cli.client_config().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };
    tracing::debug!("Client config: {:?}", config);

    let client = match WayWeDoClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("❌ Could not build client: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    match run(&client, Operation::from(cli.command)).await {
        Ok((output, success)) => {
            println!("{}", output);
            if !success {
                tracing::warn!("Server answered with non-success status {}", output);
                std::process::exit(2);
            }
        }
        Err(e) => {
            tracing::error!("❌ Request failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            let exit_code = if e.is_config_error() { 1 } else { 2 };
            std::process::exit(exit_code);
        }
    }

    Ok(())
}
