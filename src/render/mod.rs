use crate::directory::{ ConversationDirectory, ListState };
use crate::models::analysis::{ display_value, RevenueEstimates };
use crate::models::{ Analysis, ChatMessage, MessageText, Sender };
use crate::reply::COMPLETION_MARKER;
use crate::shell::ChatShell;
use crate::thread::ThreadSnapshot;

pub const ASSISTANT_NAME: &str = "Craddule";

pub fn format_analysis(analysis: &Analysis) -> String {
    let mut sections = vec![format!("📌 Summary\n{}", analysis.summary)];

    if !analysis.suggestions.is_empty() {
        let lines: Vec<String> = analysis.suggestions
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{}. {} – {}", i + 1, s.direction, s.description))
            .collect();
        sections.push(format!("💡 Suggestions\n{}", lines.join("\n")));
    }

    if !analysis.features.is_empty() {
        let lines: Vec<String> = analysis.features
            .iter()
            .map(|f| format!("• {}", f))
            .collect();
        sections.push(format!("✨ Features\n{}", lines.join("\n")));
    }

    if !analysis.monetization.is_empty() {
        let lines: Vec<String> = analysis.monetization
            .iter()
            .map(|m| format!("• {} – {}", m.stream, m.rationale))
            .collect();
        sections.push(format!("💰 Monetization\n{}", lines.join("\n")));
    }

    if !analysis.revenue_estimates.is_empty() {
        let lines: Vec<String> = match &analysis.revenue_estimates {
            RevenueEstimates::ByChannel(channels) =>
                channels
                    .iter()
                    .map(|(k, v)| format!("• {} → {}", k, display_value(v)))
                    .collect(),
            RevenueEstimates::ByStream(streams) =>
                streams
                    .iter()
                    .map(|s| {
                        format!(
                            "• {} → low {} / likely {} / high {}",
                            s.stream,
                            s.estimates.low,
                            s.estimates.likely,
                            s.estimates.high
                        )
                    })
                    .collect(),
        };
        sections.push(format!("📊 Revenue Estimates\n{}", lines.join("\n")));
    }

    if !analysis.go_to_market.is_empty() {
        let lines: Vec<String> = analysis.go_to_market
            .iter()
            .map(|g| format!("• {} → {} success", g.channel, g.success_percentage))
            .collect();
        sections.push(format!("🚀 Go-to-Market Channels\n{}", lines.join("\n")));
    }

    sections.join("\n\n")
}

fn format_message(message: &ChatMessage, offers_follow_up: bool) -> String {
    let label = match message.from {
        Sender::User => "You",
        Sender::Bot => ASSISTANT_NAME,
    };
    let body = match &message.text {
        MessageText::Plain(text) => text.clone(),
        MessageText::Analysis(analysis) => format_analysis(analysis),
    };
    let mut out = format!("{}\n{}", label, body);
    if offers_follow_up {
        out.push_str(&format!("\n\n✅ Next Step\n{}\n[YES] [NO]  (/yes or /no)", COMPLETION_MARKER));
    }
    out
}

pub fn render_thread(snapshot: &ThreadSnapshot) -> String {
    let mut blocks = Vec::new();

    if snapshot.messages.is_empty() && !snapshot.loading {
        blocks.push(
            "How can I help you today?\nShare your project idea for comprehensive analysis".to_string()
        );
    }

    let follow_up = snapshot.follow_up_index();
    for (idx, message) in snapshot.messages.iter().enumerate() {
        blocks.push(format_message(message, follow_up == Some(idx)));
    }

    if snapshot.loading {
        blocks.push(format!("{}\nThinking...", ASSISTANT_NAME));
    }

    if let Some(error) = &snapshot.error {
        blocks.push(format!("! {}", error));
    }

    blocks.join("\n\n")
}

pub fn render_directory(directory: &ConversationDirectory, active: Option<&str>) -> String {
    let conversations = match directory.state() {
        ListState::Loading => {
            return String::new();
        }
        ListState::Loaded(conversations) => conversations,
    };
    if conversations.is_empty() {
        return "No previous chats".to_string();
    }

    let editing = directory.editing();
    conversations
        .iter()
        .enumerate()
        .map(|(i, conv)| {
            let marker = if active == Some(conv.id.as_str()) { '>' } else { ' ' };
            match editing {
                Some(edit) if edit.conversation_id == conv.id =>
                    format!("{} {}. ✎ {}", marker, i + 1, edit.draft),
                _ => format!("{} {}. {}", marker, i + 1, conv.display_title()),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_shell(shell: &ChatShell) -> String {
    let mut out = String::from("── Craddule ──");
    if shell.sidebar_visible() {
        let listing = render_directory(shell.directory(), shell.active_conversation_id());
        out.push_str("\nConversations\n");
        out.push_str(&listing);
        out.push_str("\n──");
    }
    out.push('\n');
    out.push_str(&render_thread(&shell.thread().snapshot()));
    out
}
