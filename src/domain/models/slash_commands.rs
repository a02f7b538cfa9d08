#[cfg(test)]
#[path = "slash_commands_test.rs"]
mod tests;

pub struct SlashCommand {
    command: String,
    pub args: Vec<String>,
}

impl SlashCommand {
    pub fn parse(text: &str) -> Option<SlashCommand> {
        let mut args = text
            .trim()
            .split(' ')
            .filter(|e| return !e.is_empty())
            .map(|e| return e.to_string())
            .collect::<Vec<String>>();
        if args.is_empty() {
            return None;
        }
        let prefix = args[0].to_string();
        args.remove(0);

        let cmd = SlashCommand {
            command: prefix,
            args,
        };
        if cmd.is_quit()
            || cmd.is_save()
            || cmd.is_load()
            || cmd.is_clear()
            || cmd.is_history()
            || cmd.is_citations()
            || cmd.is_feedback()
            || cmd.is_help()
        {
            return Some(cmd);
        }

        return None;
    }

    /// First argument, used by commands that take an optional path.
    pub fn path_arg(&self) -> Option<&str> {
        return self.args.first().map(|e| return e.as_str());
    }

    pub fn is_quit(&self) -> bool {
        return ["/q", "/quit", "/exit"].contains(&self.command.as_str());
    }

    pub fn is_save(&self) -> bool {
        return ["/s", "/save"].contains(&self.command.as_str());
    }

    pub fn is_load(&self) -> bool {
        return ["/l", "/load"].contains(&self.command.as_str());
    }

    pub fn is_clear(&self) -> bool {
        return ["/clear"].contains(&self.command.as_str());
    }

    pub fn is_history(&self) -> bool {
        return ["/history"].contains(&self.command.as_str());
    }

    pub fn is_citations(&self) -> bool {
        return ["/c", "/citations"].contains(&self.command.as_str());
    }

    pub fn is_feedback(&self) -> bool {
        return ["/f", "/feedback"].contains(&self.command.as_str());
    }

    pub fn is_help(&self) -> bool {
        return ["/h", "/help"].contains(&self.command.as_str());
    }
}
