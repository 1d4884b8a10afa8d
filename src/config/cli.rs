use crate::config::ClientConfig;
use crate::domain::model::{
    Invitation, NewUser, ProcedureFilter, TaskInstanceFilter, UserFilter, UserUpdate,
};
use crate::utils::error::Result;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "waywedo")]
#[command(about = "Command-line client for the Way We Do task management API")]
pub struct CliConfig {
    #[arg(
        long,
        global = true,
        env = "WAYWEDO_API_TOKEN",
        hide_env_values = true,
        help = "API token sent as a bearer token"
    )]
    pub token: Option<String>,

    #[arg(
        long,
        global = true,
        env = "WAYWEDO_BASE_URL",
        help = "Override the API base URL"
    )]
    pub base_url: Option<String>,

    #[arg(long, global = true, help = "Request timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(long, global = true, help = "Load client settings from a TOML file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    #[command(about = "List procedures")]
    Procedures {
        #[arg(long)]
        team_id: Option<u64>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        tag: Option<String>,
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
        #[arg(long)]
        policy: Option<u64>,
        #[arg(long)]
        visible_to_user: Option<u64>,
        #[arg(long)]
        ordering: Option<String>,
    },

    #[command(about = "List task instances")]
    Tasks {
        #[arg(long)]
        template: Option<u64>,
        #[arg(long, help = "Assignee user id")]
        assignee: Option<u64>,
        #[arg(long)]
        content_type: Option<String>,
        #[arg(long)]
        object_id: Option<u64>,
        #[arg(long)]
        completed: Option<bool>,
        #[arg(
            long,
            value_parser = parse_lower_bound,
            help = "Due on or after (RFC 3339 or YYYY-MM-DD)"
        )]
        due_from: Option<DateTime<Utc>>,
        #[arg(
            long,
            value_parser = parse_upper_bound,
            help = "Due on or before (RFC 3339 or YYYY-MM-DD)"
        )]
        due_to: Option<DateTime<Utc>>,
    },

    #[command(about = "List users")]
    Users {
        #[arg(long)]
        team_id: Option<u64>,
        #[arg(long)]
        exclude_team_id: Option<u64>,
        #[arg(long)]
        id: Option<u64>,
        #[arg(long)]
        exclude_id: Option<u64>,
        #[arg(long)]
        status: Option<String>,
    },

    #[command(about = "Invite a new user")]
    CreateUser {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        super_manager: bool,
    },

    #[command(about = "Partially update a user")]
    UpdateUser {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        super_manager: Option<bool>,
        #[arg(long)]
        status: Option<String>,
        #[arg(
            long = "set",
            value_parser = parse_key_value,
            help = "Extra field as key=value (value may be JSON)"
        )]
        extra: Vec<(String, serde_json::Value)>,
    },

    #[command(about = "Delete a user and print the response status")]
    DeleteUser { id: u64 },

    #[command(about = "Invite a user to an object")]
    Invite {
        #[arg(long, help = "Invited user id")]
        user: u64,
        #[arg(long)]
        content_type: String,
        #[arg(long)]
        permission: String,
        #[arg(long)]
        object_id: u64,
        #[arg(long)]
        send_email: bool,
    },

    #[command(about = "Remove a team membership and print the response status")]
    DeleteTeamUser { id: u64 },
}

impl CliConfig {
    /// 合併 TOML 檔與命令列參數，命令列優先
    pub fn client_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::from_file(path)?,
            None => ClientConfig::default(),
        };

        if let Some(token) = &self.token {
            config.api_token = Some(token.clone());
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(timeout) = self.timeout {
            config.timeout_seconds = Some(timeout);
        }

        Ok(config)
    }
}

/// 各子命令轉成的客戶端請求
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    ListProcedures(ProcedureFilter),
    ListTaskInstances(TaskInstanceFilter),
    ListUsers(UserFilter),
    CreateUser(NewUser),
    UpdateUser(u64, UserUpdate),
    DeleteUser(u64),
    CreateInvitation(Invitation),
    DeleteTeamUser(u64),
}

impl From<Command> for Operation {
    fn from(command: Command) -> Self {
        match command {
            Command::Procedures {
                team_id,
                search,
                tag,
                tags,
                policy,
                visible_to_user,
                ordering,
            } => Operation::ListProcedures(ProcedureFilter {
                team_id,
                search,
                tag,
                tags,
                policy,
                visible_to_user,
                ordering,
            }),
            Command::Tasks {
                template,
                assignee,
                content_type,
                object_id,
                completed,
                due_from,
                due_to,
            } => Operation::ListTaskInstances(TaskInstanceFilter {
                template,
                assignee,
                content_type,
                object_id,
                completed,
                due_date_from: due_from,
                due_date_to: due_to,
            }),
            Command::Users {
                team_id,
                exclude_team_id,
                id,
                exclude_id,
                status,
            } => Operation::ListUsers(UserFilter {
                team_id,
                exclude_team_id,
                id,
                exclude_id,
                status,
            }),
            Command::CreateUser {
                name,
                email,
                super_manager,
            } => Operation::CreateUser(NewUser::new(name, email).super_manager(super_manager)),
            Command::UpdateUser {
                id,
                name,
                email,
                super_manager,
                status,
                extra,
            } => Operation::UpdateUser(
                id,
                UserUpdate {
                    name,
                    email,
                    is_super_manager: super_manager,
                    status,
                    extra: extra.into_iter().collect(),
                },
            ),
            Command::DeleteUser { id } => Operation::DeleteUser(id),
            Command::Invite {
                user,
                content_type,
                permission,
                object_id,
                send_email,
            } => Operation::CreateInvitation(Invitation {
                send_email,
                content_type,
                permission,
                object_id,
                user,
            }),
            Command::DeleteTeamUser { id } => Operation::DeleteTeamUser(id),
        }
    }
}

fn parse_lower_bound(raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    parse_datetime(raw, false)
}

fn parse_upper_bound(raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    parse_datetime(raw, true)
}

/// 只給日期時，下界取當天開始、上界取當天最後一秒
fn parse_datetime(raw: &str, end_of_day: bool) -> std::result::Result<DateTime<Utc>, String> {
    if let Ok(value) = DateTime::parse_from_rfc3339(raw) {
        return Ok(value.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| format!("expected RFC 3339 or YYYY-MM-DD, got '{}'", raw))?;
    let time = if end_of_day {
        date.and_hms_opt(23, 59, 59)
    } else {
        date.and_hms_opt(0, 0, 0)
    };
    time.map(|t| t.and_utc())
        .ok_or_else(|| format!("invalid date '{}'", raw))
}

fn parse_key_value(raw: &str) -> std::result::Result<(String, serde_json::Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    if key.trim().is_empty() {
        return Err(format!("empty key in '{}'", raw));
    }
    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.trim().to_string(), value))
}
