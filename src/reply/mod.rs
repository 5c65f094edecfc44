//! Chunked reply formatting for Discord message limits.
//!
//! Every command ends the same way: arbitrary-length text (model list, shell
//! output, file contents) has to be delivered as one or more bounded Discord
//! messages wrapped in a code fence. `chunks()` turns raw output plus a
//! `ChunkPolicy` into an ordered sequence of `Chunk`s; `render_messages()`
//! produces the ready-to-send strings (first message edits the deferred
//! reply, the rest go out as follow-ups).

/// Length budget and decoration for one class of Discord message.
#[derive(Debug, Clone)]
pub struct ChunkPolicy {
    /// Maximum characters of content per chunk, envelope excluded.
    /// Must be larger than `truncation_suffix` (caller contract).
    pub max_chunk_len: usize,
    /// Prepended to every chunk when rendering (e.g. "```\n").
    pub envelope_prefix: String,
    /// Appended to every chunk when rendering (e.g. "\n```").
    pub envelope_suffix: String,
    /// Appended inside the final chunk when content had to be cut.
    pub truncation_suffix: String,
    /// Stands in for the content when the input is empty.
    pub empty_placeholder: String,
    /// Hard cap on emitted chunks; the last one absorbs the cut.
    pub max_chunks: usize,
}

impl ChunkPolicy {
    /// Policy for plain-text replies in a code fence. 1980 content chars plus
    /// the 8-char fence stays under Discord's 2000-char message cap.
    pub fn plain_text() -> Self {
        Self {
            max_chunk_len: 1980,
            envelope_prefix: "```\n".to_string(),
            envelope_suffix: "\n```".to_string(),
            truncation_suffix: "\n... (output truncated)".to_string(),
            empty_placeholder: "No output.".to_string(),
            max_chunks: 2,
        }
    }

    /// Policy for embed descriptions (4096-char platform cap, no fence).
    /// Single chunk: an embed cannot be continued in a follow-up.
    pub fn embed_description() -> Self {
        Self {
            max_chunk_len: 4000,
            envelope_prefix: String::new(),
            envelope_suffix: String::new(),
            truncation_suffix: "... (list truncated)".to_string(),
            empty_placeholder: "No output.".to_string(),
            max_chunks: 1,
        }
    }

    /// Wrap chunk content in the envelope.
    pub fn envelop(&self, content: &str) -> String {
        format!("{}{}{}", self.envelope_prefix, content, self.envelope_suffix)
    }
}

impl Default for ChunkPolicy {
    fn default() -> Self {
        Self::plain_text()
    }
}

/// One bounded unit of output, ready to be enveloped and transmitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub content: String,
    /// True only when this chunk absorbed a forced cut (capacity ran out
    /// before the input did).
    pub is_truncated: bool,
    /// Exactly one chunk per sequence carries this.
    pub is_last: bool,
}

/// Lazy iterator over the chunks of one raw output. Restartable by calling
/// [`chunks`] again with the same input; pure, so the sequences are identical.
pub struct Chunks<'a> {
    remaining: &'a str,
    policy: &'a ChunkPolicy,
    /// First-chunk capacity, reduced when a header shares the message.
    first_capacity: usize,
    emitted: usize,
    done: bool,
}

/// Split `raw` into bounded chunks under `policy`. If `header` is given it
/// will share the first message, so its length (plus a separating newline) is
/// subtracted from the first chunk's capacity.
pub fn chunks<'a>(raw: &'a str, header: Option<&str>, policy: &'a ChunkPolicy) -> Chunks<'a> {
    let header_cost = header.map(|h| h.chars().count() + 1).unwrap_or(0);
    Chunks {
        remaining: raw,
        policy,
        first_capacity: policy.max_chunk_len.saturating_sub(header_cost),
        emitted: 0,
        done: false,
    }
}

/// Split `s` after `n` characters (not bytes; never lands inside a code point).
fn split_at_chars(s: &str, n: usize) -> (&str, &str) {
    match s.char_indices().nth(n) {
        Some((idx, _)) => s.split_at(idx),
        None => (s, ""),
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        if self.done {
            return None;
        }

        if self.emitted == 0 && self.remaining.is_empty() {
            self.done = true;
            return Some(Chunk {
                content: self.policy.empty_placeholder.clone(),
                is_truncated: false,
                is_last: true,
            });
        }

        let capacity = if self.emitted == 0 {
            self.first_capacity
        } else {
            self.policy.max_chunk_len
        };

        if self.remaining.chars().count() <= capacity {
            self.done = true;
            return Some(Chunk {
                content: std::mem::take(&mut self.remaining).to_string(),
                is_truncated: false,
                is_last: true,
            });
        }

        let last_allowed = self.emitted + 1 == self.policy.max_chunks;
        if last_allowed {
            // Out of chunks with input left over: hard cut, keep room for the marker.
            let keep = capacity.saturating_sub(self.policy.truncation_suffix.chars().count());
            let (head, _) = split_at_chars(self.remaining, keep);
            let content = format!("{}{}", head, self.policy.truncation_suffix);
            self.remaining = "";
            self.done = true;
            return Some(Chunk {
                content,
                is_truncated: true,
                is_last: true,
            });
        }

        let (head, rest) = split_at_chars(self.remaining, capacity);
        self.remaining = rest;
        self.emitted += 1;
        Some(Chunk {
            content: head.to_string(),
            is_truncated: false,
            is_last: false,
        })
    }
}

/// Produce the ready-to-send message strings for `raw`: each chunk enveloped,
/// the optional header prepended to the first.
pub fn render_messages(header: Option<&str>, raw: &str, policy: &ChunkPolicy) -> Vec<String> {
    chunks(raw, header, policy)
        .enumerate()
        .map(|(i, chunk)| {
            let enveloped = policy.envelop(&chunk.content);
            match (i, header) {
                (0, Some(h)) => format!("{}\n{}", h, enveloped),
                _ => enveloped,
            }
        })
        .collect()
}
