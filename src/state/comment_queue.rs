use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// A review comment anchored to a line range of one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewComment {
    pub id: u64,
    pub file: String,
    pub start_line: u32,
    pub end_line: u32,
    pub code_context: String,
    pub comment: String,
}

/// Where a new comment points. Lines are 1-based and inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentAnchor {
    pub file: String,
    pub start_line: u32,
    pub end_line: u32,
}

/// FIFO of review comments waiting to be handed off. Ids start at 1 and are
/// never reused, even after dequeueing.
#[derive(Debug)]
pub struct CommentQueue {
    queue: VecDeque<ReviewComment>,
    next_id: u64,
}

impl Default for CommentQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl CommentQueue {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            next_id: 1,
        }
    }

    pub fn enqueue(&mut self, anchor: CommentAnchor, code_context: String, comment: String) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.queue.push_back(ReviewComment {
            id,
            file: anchor.file,
            start_line: anchor.start_line,
            end_line: anchor.end_line,
            code_context,
            comment,
        });
        id
    }

    pub fn dequeue(&mut self) -> Option<ReviewComment> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReviewComment> {
        self.queue.iter()
    }

    /// Whether any pending comment covers `line` of `file`.
    pub fn has_comment_at(&self, file: &str, line: u32) -> bool {
        self.queue
            .iter()
            .any(|c| c.file == file && (c.start_line..=c.end_line).contains(&line))
    }
}
