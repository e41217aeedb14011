use std::fmt;

/// The closed set of response codes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseCode {
    /// Command succeeded
    Okay,
    /// Command was malformed or not applicable (protocol-level rejection)
    What,
    /// Command was well-formed but failed
    Fail,
    /// Greeting sent on attach
    Ohai,
    State,
    Time,
    File,
    Features,
    /// The loaded track ran off its end
    End,
    /// Listing header for a resource directory: path, child count
    Directory,
}

impl ResponseCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseCode::Okay => "OKAY",
            ResponseCode::What => "WHAT",
            ResponseCode::Fail => "FAIL",
            ResponseCode::Ohai => "OHAI",
            ResponseCode::State => "STATE",
            ResponseCode::Time => "TIME",
            ResponseCode::File => "FILE",
            ResponseCode::Features => "FEATURES",
            ResponseCode::End => "END",
            ResponseCode::Directory => "Directory",
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single response line: a code followed by ordered arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    code: ResponseCode,
    args: Vec<String>,
}

impl Response {
    pub fn new(code: ResponseCode) -> Self {
        Self {
            code,
            args: Vec::new(),
        }
    }

    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn code(&self) -> ResponseCode {
        self.code
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Packs the response into one wire line, without the line terminator.
    ///
    /// Arguments that would not survive tokenizing are single-quoted.
    pub fn pack(&self) -> String {
        let mut line = String::from(self.code.as_str());
        for arg in &self.args {
            line.push(' ');
            line.push_str(&escape_arg(arg));
        }
        line
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pack())
    }
}

fn needs_quoting(arg: &str) -> bool {
    arg.is_empty()
        || arg
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '\'' | '"' | '\\'))
}

fn escape_arg(arg: &str) -> String {
    if !needs_quoting(arg) {
        return arg.to_owned();
    }

    let mut escaped = String::with_capacity(arg.len() + 2);
    escaped.push('\'');
    for c in arg.chars() {
        if c == '\'' {
            // Close the quote, emit an escaped quote, reopen.
            escaped.push_str("'\\''");
        } else {
            escaped.push(c);
        }
    }
    escaped.push('\'');
    escaped
}
