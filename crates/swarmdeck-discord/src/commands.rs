// ABOUTME: Slash commands for operating the panel from Discord.
// ABOUTME: Parses interaction data into PanelCommand, executes it, and describes commands for registration.

use crate::interaction::CommandData;
use serde_json::{json, Value};
use swarmdeck_core::{Panel, PanelStatus};
use tracing::info;

/// Discord option type for strings.
const OPTION_STRING: u8 = 3;
/// Discord option type for booleans.
const OPTION_BOOLEAN: u8 = 5;

/// Parsed slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelCommand {
    /// Toggle whether processed log lines are published: /logs visible:<bool>
    Logs { visible: bool },
    /// Mark the panel offline and stop all workers: /shutdown
    Shutdown,
    /// Mark the panel online again: /online
    Online,
    /// Start a category: /start category:<id>
    Start(String),
    /// Stop one category or everything: /stop [category:<id>]
    Stop(Option<String>),
    /// Queue free text for the desktop consumer: /queue text:<...>
    Queue(String),
    /// Report panel status: /status
    Status,
    /// Command that is missing a required option.
    Invalid(String),
    /// Unknown command name.
    Unknown(String),
}

impl PanelCommand {
    pub fn parse(data: &CommandData) -> PanelCommand {
        match data.name.as_str() {
            "logs" => match data.boolean("visible") {
                Some(visible) => PanelCommand::Logs { visible },
                None => PanelCommand::Invalid("logs (requires visible:true or visible:false)".into()),
            },
            "shutdown" => PanelCommand::Shutdown,
            "online" => PanelCommand::Online,
            "start" => match data.string("category") {
                Some(category) => PanelCommand::Start(category),
                None => PanelCommand::Invalid("start (requires category)".into()),
            },
            "stop" => PanelCommand::Stop(data.string("category")),
            "queue" => match data.string("text") {
                Some(text) => PanelCommand::Queue(text),
                None => PanelCommand::Invalid("queue (requires text)".into()),
            },
            "status" => PanelCommand::Status,
            other => PanelCommand::Unknown(other.to_string()),
        }
    }
}

/// Execute a command against the panel and return the reply text.
pub async fn execute(command: PanelCommand, panel: &Panel) -> String {
    match command {
        PanelCommand::Logs { visible } => {
            panel.feed().set_visible(visible);
            if visible {
                "Logs are now visible".to_string()
            } else {
                "Logs are now hidden".to_string()
            }
        }
        PanelCommand::Shutdown => {
            let outcome = panel.shutdown().await;
            format!("Panel is offline. {}", outcome.message)
        }
        PanelCommand::Online => {
            if panel.bring_online() {
                "Panel is back online".to_string()
            } else {
                "Panel is already online".to_string()
            }
        }
        PanelCommand::Start(category) => match panel.start(&category).await {
            Ok(categories) => {
                info!(category = %category, "Category started from Discord");
                format!(
                    "Started `{}` ({}/{} slots in use)",
                    category,
                    categories.len(),
                    swarmdeck_core::MAX_SLOTS
                )
            }
            Err(e) => format!("Could not start `{}`: {}", category, e),
        },
        PanelCommand::Stop(category) => panel.stop(category.as_deref()).await.message,
        PanelCommand::Queue(text) => match panel.commands().enqueue(&text) {
            Some(queued) => format!("Queued command `{}`", queued.id),
            None => "Nothing to queue".to_string(),
        },
        PanelCommand::Status => format_status(&panel.status()),
        PanelCommand::Invalid(usage) => format!("Missing option: {}", usage),
        PanelCommand::Unknown(name) => format!("Unknown command `{}`.\n\n{}", name, help_text()),
    }
}

pub fn format_status(status: &PanelStatus) -> String {
    let categories = if status.worker.categories.is_empty() {
        "none".to_string()
    } else {
        status.worker.categories.join(", ")
    };
    format!(
        "**Panel:** {}\n**Logs:** {}\n**Worker:** {} ({}/{} slots)\n**Categories:** {}\n**Restarts:** {}\n**Pending commands:** {}",
        if status.online { "online" } else { "offline" },
        if status.logs_visible { "visible" } else { "hidden" },
        status.worker.state,
        status.worker.slots_used,
        status.worker.slots_max,
        categories,
        status.worker.restarts,
        status.pending_commands,
    )
}

fn help_text() -> &'static str {
    "**Commands:**\n\
     `/status` - Show panel status\n\
     `/start category:<id>` - Start a slot\n\
     `/stop [category:<id>]` - Stop one slot or everything\n\
     `/logs visible:<bool>` - Show or hide log output\n\
     `/queue text:<text>` - Queue a command for the desktop client\n\
     `/shutdown` - Take the panel offline\n\
     `/online` - Bring the panel back online"
}

/// Command definitions for bulk registration.
pub fn definitions() -> Value {
    let string_opt = |name: &str, description: &str, required: bool| {
        json!({ "name": name, "description": description, "type": OPTION_STRING, "required": required })
    };
    json!([
        { "name": "status", "description": "Show panel status", "type": 1 },
        {
            "name": "start", "description": "Start a slot", "type": 1,
            "options": [string_opt("category", "Category id", true)]
        },
        {
            "name": "stop", "description": "Stop one slot or everything", "type": 1,
            "options": [string_opt("category", "Category id; omit to stop all", false)]
        },
        {
            "name": "logs", "description": "Show or hide log output", "type": 1,
            "options": [{ "name": "visible", "description": "Publish log lines", "type": OPTION_BOOLEAN, "required": true }]
        },
        {
            "name": "queue", "description": "Queue a command for the desktop client", "type": 1,
            "options": [string_opt("text", "Command text", true)]
        },
        { "name": "shutdown", "description": "Take the panel offline", "type": 1 },
        { "name": "online", "description": "Bring the panel back online", "type": 1 }
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(raw: Value) -> CommandData {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn parse_start_requires_category() {
        let cmd = PanelCommand::parse(&data(json!({
            "name": "start",
            "options": [{ "name": "category", "type": 3, "value": "abc" }]
        })));
        assert_eq!(cmd, PanelCommand::Start("abc".into()));

        let cmd = PanelCommand::parse(&data(json!({ "name": "start" })));
        assert!(matches!(cmd, PanelCommand::Invalid(_)));

        let cmd = PanelCommand::parse(&data(json!({
            "name": "start",
            "options": [{ "name": "category", "type": 3, "value": "   " }]
        })));
        assert!(matches!(cmd, PanelCommand::Invalid(_)));
    }

    #[test]
    fn parse_stop_category_is_optional() {
        assert_eq!(
            PanelCommand::parse(&data(json!({ "name": "stop" }))),
            PanelCommand::Stop(None)
        );
        assert_eq!(
            PanelCommand::parse(&data(json!({
                "name": "stop",
                "options": [{ "name": "category", "type": 3, "value": "x" }]
            }))),
            PanelCommand::Stop(Some("x".into()))
        );
    }

    #[test]
    fn parse_logs_and_queue() {
        assert_eq!(
            PanelCommand::parse(&data(json!({
                "name": "logs",
                "options": [{ "name": "visible", "type": 5, "value": false }]
            }))),
            PanelCommand::Logs { visible: false }
        );
        assert_eq!(
            PanelCommand::parse(&data(json!({
                "name": "queue",
                "options": [{ "name": "text", "type": 3, "value": "restart lobby" }]
            }))),
            PanelCommand::Queue("restart lobby".into())
        );
        assert!(matches!(
            PanelCommand::parse(&data(json!({ "name": "logs" }))),
            PanelCommand::Invalid(_)
        ));
    }

    #[test]
    fn parse_simple_and_unknown() {
        assert_eq!(PanelCommand::parse(&data(json!({ "name": "status" }))), PanelCommand::Status);
        assert_eq!(PanelCommand::parse(&data(json!({ "name": "shutdown" }))), PanelCommand::Shutdown);
        assert_eq!(PanelCommand::parse(&data(json!({ "name": "online" }))), PanelCommand::Online);
        assert_eq!(
            PanelCommand::parse(&data(json!({ "name": "dance" }))),
            PanelCommand::Unknown("dance".into())
        );
    }

    #[test]
    fn definitions_cover_every_command() {
        let defs = definitions();
        let names: Vec<&str> = defs
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["name"].as_str().unwrap())
            .collect();
        for name in ["status", "start", "stop", "logs", "queue", "shutdown", "online"] {
            assert!(names.contains(&name), "missing {name}");
        }
    }
}
