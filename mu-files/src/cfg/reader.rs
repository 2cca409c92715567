use crate::ParserError;
use crate::cfg::types::ConfigNode;

const UTF8_BOM: &str = "\u{feff}";

struct OpenNode {
    name: String,
    node: ConfigNode,
    line: usize,
}

/// Line based parser for the ConfigNode grammar.
///
/// Values are not interpreted: `pos = 0,1,2` stays the string `0,1,2`.
pub struct ConfigReader {
    root: ConfigNode,
    stack: Vec<OpenNode>,
    // A bare word is either the name of a node whose `{` follows, or a key without value.
    pending: Option<String>,
}

impl ConfigReader {
    pub fn parse_bytes(bytes: &[u8]) -> Result<ConfigNode, ParserError> {
        let text = String::from_utf8(bytes.to_vec())?;
        ConfigReader::parse(&text)
    }

    pub fn parse(text: &str) -> Result<ConfigNode, ParserError> {
        let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);
        let mut reader = ConfigReader {
            root: ConfigNode::default(),
            stack: Vec::new(),
            pending: None,
        };

        let mut line_count = 0;
        for (index, line) in text.lines().enumerate() {
            line_count = index + 1;
            reader.parse_line(strip_comment(line), line_count)?;
        }

        reader.finish(line_count)
    }

    fn parse_line(&mut self, line: &str, line_no: usize) -> Result<(), ParserError> {
        let mut rest = line.trim();
        let mut opened_on_line = false;

        while !rest.is_empty() {
            let Some(at) = rest.find(['=', '{', '}']) else {
                self.flush_pending();
                self.pending = Some(rest.to_owned());
                break;
            };

            let word = rest[..at].trim();
            match rest.as_bytes()[at] {
                b'=' => {
                    self.flush_pending();
                    let value = &rest[at + 1..];
                    // on a single line node (`MODEL { model = x }`) the closing brace ends the value
                    let end = match opened_on_line {
                        true => value.find('}').unwrap_or(value.len()),
                        false => value.len(),
                    };
                    self.current().values.push((word.to_owned(), value[..end].trim().to_owned()));
                    rest = value[end..].trim_start();
                }
                b'{' => {
                    let name = match (word.is_empty(), self.pending.take()) {
                        (true, Some(pending)) => pending,
                        (_, pending) => {
                            self.pending = pending;
                            self.flush_pending();
                            word.to_owned()
                        }
                    };
                    self.stack.push(OpenNode {
                        name,
                        node: ConfigNode::default(),
                        line: line_no,
                    });
                    opened_on_line = true;
                    rest = rest[at + 1..].trim_start();
                }
                _ => {
                    if !word.is_empty() {
                        self.flush_pending();
                        self.pending = Some(word.to_owned());
                    }
                    self.close(line_no)?;
                    rest = rest[at + 1..].trim_start();
                }
            }
        }

        Ok(())
    }

    fn current(&mut self) -> &mut ConfigNode {
        match self.stack.last_mut() {
            Some(open) => &mut open.node,
            None => &mut self.root,
        }
    }

    fn flush_pending(&mut self) {
        if let Some(key) = self.pending.take() {
            self.current().values.push((key, String::new()));
        }
    }

    fn close(&mut self, line_no: usize) -> Result<(), ParserError> {
        self.flush_pending();
        let Some(OpenNode { name, node, .. }) = self.stack.pop() else {
            return Err(ParserError::UnbalancedBraces {
                line: line_no,
                reason: "'}' without a matching '{'".to_owned(),
            });
        };

        self.current().nodes.push((name, node));
        Ok(())
    }

    fn finish(mut self, line_count: usize) -> Result<ConfigNode, ParserError> {
        self.flush_pending();
        if let Some(open) = self.stack.last() {
            return Err(ParserError::UnbalancedBraces {
                line: line_count,
                reason: format!("node '{}' opened at line {} is never closed", open.name, open.line),
            });
        }

        Ok(self.root)
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(at) => &line[..at],
        None => line,
    }
}

impl ConfigNode {
    pub fn parse(text: &str) -> Result<ConfigNode, ParserError> {
        ConfigReader::parse(text)
    }

    /// Decodes `bytes` as UTF-8 first, files in other encodings are rejected.
    pub fn parse_bytes(bytes: &[u8]) -> Result<ConfigNode, ParserError> {
        ConfigReader::parse_bytes(bytes)
    }
}
