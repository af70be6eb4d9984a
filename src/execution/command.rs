use std::fmt;

/// Where a command runs relative to the invocation's execution target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// On the execution target: the staged directory on the control host
    /// when remote, the project root when local.
    Target,
    /// Always on the operator's machine, never staged. Used for interactive
    /// ssh sessions and for probing the control host itself.
    Operator,
}

/// Structured description of one command. The executor owns all quoting;
/// callers never assemble shell strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub capture_output: bool,
    pub must_succeed: bool,
    pub dispatch: Dispatch,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            capture_output: false,
            must_succeed: true,
            dispatch: Dispatch::Target,
        }
    }

    /// `sh -c <script>`, for commands that need shell expansion.
    pub fn shell(script: impl Into<String>) -> Self {
        Self::new("sh").arg("-c").arg(script)
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn capture(mut self) -> Self {
        self.capture_output = true;
        self
    }

    /// Return the output even when the command exits non-zero.
    pub fn allow_failure(mut self) -> Self {
        self.must_succeed = false;
        self
    }

    pub fn on_operator_host(mut self) -> Self {
        self.dispatch = Dispatch::Operator;
        self
    }

    pub fn has_arg(&self, needle: &str) -> bool {
        self.args.iter().any(|arg| arg == needle)
    }

    /// Shell-quoted command line, suitable for a remote shell or for logs.
    pub fn command_line(&self) -> String {
        let words = std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str));
        shell_words::join(words)
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_quotes_arguments() {
        let spec = CommandSpec::new("ansible")
            .args(["compute", "-m", "shell", "-a"])
            .arg("shutdown -r now");
        assert_eq!(spec.command_line(), "ansible compute -m shell -a 'shutdown -r now'");
    }

    #[test]
    fn shell_script_is_a_single_argument() {
        let spec = CommandSpec::shell("echo 'hi' | wc -c");
        assert_eq!(spec.args, vec!["-c".to_string(), "echo 'hi' | wc -c".to_string()]);
        assert_eq!(
            shell_words::split(&spec.command_line()).unwrap(),
            vec!["sh", "-c", "echo 'hi' | wc -c"]
        );
    }

    #[test]
    fn defaults_are_strict_and_streamed() {
        let spec = CommandSpec::new("true");
        assert!(spec.must_succeed);
        assert!(!spec.capture_output);
        assert_eq!(spec.dispatch, Dispatch::Target);
    }
}
