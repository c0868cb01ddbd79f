//! Line commands read from stdin, turned into messages.

use dashboard_core::{Msg, PageKind, StatusFilter};

pub const HELP: &str = "commands: filter <page> <all|active|inactive|recent> | search <page> [text] | \
open <page> <id> | close <page> | refresh <page> | retry <page> | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Send(Msg),
    Help,
    Quit,
}

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (verb, rest) = split_word(line);
    let command = match verb.to_ascii_lowercase().as_str() {
        "quit" | "exit" => Command::Quit,
        "help" | "?" => Command::Help,
        "filter" => {
            let (page, rest) = page_arg(rest)?;
            let filter: StatusFilter = rest.parse()?;
            Command::Send(Msg::FilterChanged { page, filter })
        }
        "search" => {
            let (page, text) = page_arg(rest)?;
            Command::Send(Msg::SearchChanged {
                page,
                text: text.to_string(),
            })
        }
        "open" => {
            let (page, id) = page_arg(rest)?;
            if id.is_empty() {
                return Err(format!("open {page} needs an id"));
            }
            let id = id.to_string();
            Command::Send(match page {
                PageKind::Conversations => Msg::ConversationSelected {
                    conversation_id: id,
                },
                PageKind::Plugins => Msg::PluginSelected { plugin_id: id },
            })
        }
        "close" => Command::Send(Msg::DetailClosed(page_only(rest)?)),
        "refresh" => Command::Send(Msg::RefreshClicked(page_only(rest)?)),
        "retry" => Command::Send(Msg::RetryClicked(page_only(rest)?)),
        other => return Err(format!("unknown command '{other}'")),
    };
    Ok(Some(command))
}

fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(end) => (&text[..end], text[end..].trim()),
        None => (text, ""),
    }
}

fn page_arg(rest: &str) -> Result<(PageKind, &str), String> {
    let (page, rest) = split_word(rest);
    if page.is_empty() {
        return Err("missing page (conversations or plugins)".to_string());
    }
    Ok((page.parse()?, rest))
}

fn page_only(rest: &str) -> Result<PageKind, String> {
    let (page, extra) = page_arg(rest)?;
    if !extra.is_empty() {
        return Err(format!("unexpected argument '{extra}'"));
    }
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Command {
        parse_command(line).unwrap().unwrap()
    }

    #[test]
    fn blank_line_is_ignored() {
        assert_eq!(parse_command("   "), Ok(None));
    }

    #[test]
    fn filter_and_search() {
        assert_eq!(
            parse("filter conv recent"),
            Command::Send(Msg::FilterChanged {
                page: PageKind::Conversations,
                filter: StatusFilter::Recent,
            })
        );
        assert_eq!(
            parse("search plugins  GitHub Integration "),
            Command::Send(Msg::SearchChanged {
                page: PageKind::Plugins,
                text: "GitHub Integration".to_string(),
            })
        );
        assert_eq!(
            parse("search plugins"),
            Command::Send(Msg::SearchChanged {
                page: PageKind::Plugins,
                text: String::new(),
            })
        );
    }

    #[test]
    fn open_selects_per_page() {
        assert_eq!(
            parse("open conversations 42"),
            Command::Send(Msg::ConversationSelected {
                conversation_id: "42".to_string()
            })
        );
        assert_eq!(
            parse("OPEN plug gh"),
            Command::Send(Msg::PluginSelected {
                plugin_id: "gh".to_string()
            })
        );
        assert!(parse_command("open plugins").is_err());
    }

    #[test]
    fn page_commands() {
        assert_eq!(
            parse("retry plugins"),
            Command::Send(Msg::RetryClicked(PageKind::Plugins))
        );
        assert_eq!(
            parse("refresh conversations"),
            Command::Send(Msg::RefreshClicked(PageKind::Conversations))
        );
        assert_eq!(
            parse("close conv"),
            Command::Send(Msg::DetailClosed(PageKind::Conversations))
        );
        assert_eq!(parse("quit"), Command::Quit);
    }

    #[test]
    fn errors_are_descriptive() {
        assert_eq!(
            parse_command("filter plugins archived"),
            Err("unknown status filter 'archived'".to_string())
        );
        assert_eq!(
            parse_command("launch"),
            Err("unknown command 'launch'".to_string())
        );
        assert!(parse_command("retry").is_err());
        assert!(parse_command("retry plugins now").is_err());
    }
}
