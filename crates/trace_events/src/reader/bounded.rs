use std::io::{BufRead, ErrorKind};

#[derive(Debug, Eq, PartialEq)]
pub enum BoundedLine {
    Line {
        line_number: usize,
        bytes: Vec<u8>,
    },
    LineTooLong {
        line_number: usize,
        observed_bytes: usize,
        max_line_bytes: usize,
    },
    IoError {
        line_number: usize,
    },
}

/// Splits a reader into `\n`-terminated lines without ever buffering more than
/// `max_line_bytes` of a single line. Oversized lines are skipped to their newline and reported
/// once; iteration then continues with the next line.
pub struct BoundedLineReader<R: BufRead> {
    reader: R,
    max_line_bytes: usize,
    line_number: usize,
    done: bool,
}

impl<R: BufRead> BoundedLineReader<R> {
    pub fn new(reader: R, max_line_bytes: usize) -> Self {
        Self {
            reader,
            max_line_bytes,
            line_number: 0,
            done: false,
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: BufRead> Iterator for BoundedLineReader<R> {
    type Item = BoundedLine;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut line = Vec::new();
        let mut observed_bytes = 0usize;
        let mut too_long = false;
        let mut saw_bytes = false;

        loop {
            let (consumed, hit_newline) = {
                let chunk = match self.reader.fill_buf() {
                    Ok(chunk) => chunk,
                    Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                    Err(_) => {
                        self.done = true;
                        self.line_number += 1;
                        return Some(BoundedLine::IoError {
                            line_number: self.line_number,
                        });
                    }
                };

                if chunk.is_empty() {
                    self.done = true;
                    if !saw_bytes {
                        return None;
                    }
                    break;
                }
                saw_bytes = true;

                let newline = chunk.iter().position(|b| *b == b'\n');
                let segment_len = newline.unwrap_or(chunk.len());
                observed_bytes = observed_bytes.saturating_add(segment_len);
                if !too_long {
                    if observed_bytes > self.max_line_bytes {
                        too_long = true;
                        line = Vec::new();
                    } else {
                        line.extend_from_slice(&chunk[..segment_len]);
                    }
                }

                match newline {
                    Some(idx) => (idx + 1, true),
                    None => (segment_len, false),
                }
            };

            self.reader.consume(consumed);
            if hit_newline {
                break;
            }
        }

        self.line_number += 1;
        if too_long {
            return Some(BoundedLine::LineTooLong {
                line_number: self.line_number,
                observed_bytes,
                max_line_bytes: self.max_line_bytes,
            });
        }
        Some(BoundedLine::Line {
            line_number: self.line_number,
            bytes: line,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_record_is_reported_and_following_records_still_read() {
        let mut trace = b"{}\n".to_vec();
        trace.extend(std::iter::repeat(b'x').take(50));
        trace.extend_from_slice(b"\nnext");

        let small_buffer = std::io::BufReader::with_capacity(8, trace.as_slice());
        let out: Vec<BoundedLine> = BoundedLineReader::new(small_buffer, 16).collect();

        assert_eq!(out.len(), 3);
        assert_eq!(
            out[0],
            BoundedLine::Line {
                line_number: 1,
                bytes: b"{}".to_vec()
            }
        );
        assert_eq!(
            out[1],
            BoundedLine::LineTooLong {
                line_number: 2,
                observed_bytes: 50,
                max_line_bytes: 16
            }
        );
        assert_eq!(
            out[2],
            BoundedLine::Line {
                line_number: 3,
                bytes: b"next".to_vec()
            }
        );
    }

    #[test]
    fn trailing_newline_does_not_yield_an_empty_line() {
        let reader = BoundedLineReader::new(&b"a\nb\n"[..], 16);
        assert_eq!(reader.count(), 2);
    }
}
