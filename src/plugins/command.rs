use crate::common::{md_fmt, RE};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Upload,
    Remove(String),
    List,
    /// target channel: a `<#id>` mention or a name
    Post(Option<String>),
    Clear(Option<String>),
    ClearAll,
    Help,
    /// known command, missing argument; holds the usage line
    Usage(&'static str),
}

impl Command {
    /// Parses `content` if it starts with `prefix` followed by a known command.
    pub fn parse(prefix: &str, content: &str) -> Option<Self> {
        let mut convec = content.split_whitespace();
        let name = convec.next()?.strip_prefix(prefix)?;
        let arg = convec.next().map(String::from);

        Some(match name {
            "upload" | "upload_memes" => Command::Upload,
            "remove" | "removememe" => match arg {
                Some(url) => Command::Remove(url),
                None => Command::Usage("remove <url>"),
            },
            "list" | "listmemes" => Command::List,
            "post" | "post_memes" => Command::Post(arg),
            "clear" | "clear_channel" => Command::Clear(arg),
            "clearall" | "clear_all" => Command::ClearAll,
            "help" => Command::Help,
            _ => return None,
        })
    }

    pub fn needs_owner(&self) -> bool {
        !matches!(
            self,
            Command::Post(_) | Command::Help | Command::Usage(_)
        )
    }
}

pub fn help(prefix: &str) -> String {
    format!(
        "### Memebot\n{} {}\n{} {}\n{} {}\n{} {}\n{} {}\n{} {}",
        md_fmt(&format!("{prefix}upload"), RE::Insert),
        "Upload images in DMs (owner)",
        md_fmt(&format!("{prefix}remove URL"), RE::Rm),
        "Remove a meme (owner)",
        md_fmt(&format!("{prefix}list"), RE::Search),
        "List stored memes (owner)",
        md_fmt(&format!("{prefix}post [#channel]"), RE::Send),
        "Post every meme the channel has not seen",
        md_fmt(&format!("{prefix}clear [#channel]"), RE::Clear),
        "Forget what was posted to a channel (owner)",
        md_fmt(&format!("{prefix}clearall"), RE::Clear),
        "Forget all posting history (owner)",
    )
}
