//! Structural pre-scan of pickle streams.
//!
//! Walks the opcode stream without building any values and measures the
//! shape the unpickled result would have. Memo entries share node ids with
//! the stack, so a container mutated through a memo reference is measured
//! with its final contents. Streams that would nest deeper than the codec
//! accepts, expand past [`MAX_VALUES`] once shared references are resolved,
//! or contain themselves are rejected before the real decoder recurses.

use std::collections::HashMap;

use crate::codec::MAX_DEPTH;
use crate::error::DecodeError;

/// Most values a payload may expand to once shared references are resolved.
pub(crate) const MAX_VALUES: usize = 1 << 18;

/// Containers allowed on one path: the top-level mapping plus `MAX_DEPTH` levels.
const MAX_CONTAINERS: usize = MAX_DEPTH + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Mark,
    Leaf,
    Node(usize),
}

#[derive(Debug, Clone, Copy)]
enum Visit {
    New,
    Active,
    Done,
}

fn malformed(reason: impl Into<String>) -> DecodeError {
    DecodeError::Pickle(reason.into())
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| malformed("unexpected end of stream"))?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn byte(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    /// Little-endian unsigned integer of `width` bytes.
    fn uint(&mut self, width: usize) -> Result<u64, DecodeError> {
        let bytes = self.take(width)?;
        Ok(bytes
            .iter()
            .rev()
            .fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
    }

    fn line(&mut self) -> Result<&'a [u8], DecodeError> {
        let rest = &self.data[self.pos..];
        let len = rest
            .iter()
            .position(|b| *b == b'\n')
            .ok_or_else(|| malformed("unterminated line argument"))?;
        self.pos += len + 1;
        Ok(&rest[..len])
    }

    fn skip_prefixed(&mut self, width: usize) -> Result<(), DecodeError> {
        let len = usize::try_from(self.uint(width)?)
            .map_err(|_| malformed("length prefix out of range"))?;
        self.take(len).map(|_| ())
    }

    fn line_index(&mut self) -> Result<u64, DecodeError> {
        std::str::from_utf8(self.line()?)
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .ok_or_else(|| malformed("invalid memo index"))
    }
}

#[derive(Default)]
struct Graph {
    stack: Vec<Slot>,
    children: Vec<Vec<Slot>>,
    memo: HashMap<u64, Slot>,
}

impl Graph {
    fn push_leaf(&mut self) {
        self.stack.push(Slot::Leaf);
    }

    fn push_node(&mut self, children: Vec<Slot>) {
        self.children.push(children);
        self.stack.push(Slot::Node(self.children.len() - 1));
    }

    fn pop(&mut self) -> Result<Slot, DecodeError> {
        self.stack.pop().ok_or_else(|| malformed("stack underflow"))
    }

    fn pop_value(&mut self) -> Result<Slot, DecodeError> {
        match self.pop()? {
            Slot::Mark => Err(malformed("unexpected mark")),
            slot => Ok(slot),
        }
    }

    fn pop_values(&mut self, n: usize) -> Result<Vec<Slot>, DecodeError> {
        let mut values = (0..n)
            .map(|_| self.pop_value())
            .collect::<Result<Vec<_>, _>>()?;
        values.reverse();
        Ok(values)
    }

    fn pop_mark(&mut self) -> Result<Vec<Slot>, DecodeError> {
        let mark = self
            .stack
            .iter()
            .rposition(|slot| *slot == Slot::Mark)
            .ok_or_else(|| malformed("missing mark"))?;
        let items = self.stack.split_off(mark + 1);
        self.stack.pop();
        Ok(items)
    }

    fn top(&self) -> Result<Slot, DecodeError> {
        match self.stack.last() {
            Some(Slot::Mark) | None => Err(malformed("no value on stack")),
            Some(slot) => Ok(*slot),
        }
    }

    fn extend_top(&mut self, items: Vec<Slot>) -> Result<(), DecodeError> {
        match self.top()? {
            Slot::Node(id) => {
                self.children[id].extend(items);
                Ok(())
            }
            _ => Err(malformed("items added to a scalar")),
        }
    }

    fn memo_put(&mut self, index: u64) -> Result<(), DecodeError> {
        let top = self.top()?;
        self.memo.insert(index, top);
        Ok(())
    }

    fn memo_get(&mut self, index: u64) -> Result<(), DecodeError> {
        let slot = self
            .memo
            .get(&index)
            .copied()
            .ok_or_else(|| malformed(format!("memo key {index} missing")))?;
        self.stack.push(slot);
        Ok(())
    }

    /// Depth-first walk from `root` that fails on cycles, on paths with more
    /// than [`MAX_CONTAINERS`] containers and on expansion past [`MAX_VALUES`].
    fn measure(&self, root: usize) -> Result<(), DecodeError> {
        let count = self.children.len();
        let mut visit = vec![Visit::New; count];
        let mut height = vec![0usize; count];
        let mut size = vec![0usize; count];

        let mut path = vec![(root, 0usize)];
        visit[root] = Visit::Active;

        while let Some(&(node, next)) = path.last() {
            if let Some(child) = self.children[node].get(next) {
                if let Some(frame) = path.last_mut() {
                    frame.1 += 1;
                }
                let Slot::Node(child) = *child else {
                    continue;
                };
                match visit[child] {
                    Visit::Active => return Err(malformed("self-referencing structure")),
                    Visit::Done => {
                        if path.len() + height[child] > MAX_CONTAINERS {
                            return Err(DecodeError::TooDeep(MAX_DEPTH));
                        }
                    }
                    Visit::New => {
                        if path.len() >= MAX_CONTAINERS {
                            return Err(DecodeError::TooDeep(MAX_DEPTH));
                        }
                        visit[child] = Visit::Active;
                        path.push((child, 0));
                    }
                }
                continue;
            }

            path.pop();
            visit[node] = Visit::Done;
            let (tallest, total) =
                self.children[node]
                    .iter()
                    .fold((0, 1usize), |(tallest, total), child| match child {
                        Slot::Node(c) => (tallest.max(height[*c]), total.saturating_add(size[*c])),
                        _ => (tallest, total.saturating_add(1)),
                    });
            if total > MAX_VALUES {
                return Err(malformed(format!(
                    "payload expands past {MAX_VALUES} values"
                )));
            }
            height[node] = tallest + 1;
            size[node] = total;
        }

        Ok(())
    }
}

/// Checks the shape of a pickle stream before it is unpickled.
///
/// Only structure is verified here. Whether the opcodes describe values
/// the codec accepts is left to the decoder.
pub(crate) fn check_structure(payload: &[u8]) -> Result<(), DecodeError> {
    let mut cursor = Cursor {
        data: payload,
        pos: 0,
    };
    let mut graph = Graph::default();

    loop {
        let op = cursor.byte()?;
        match op {
            // STOP
            b'.' => break,
            b'(' => graph.stack.push(Slot::Mark),

            // Scalars.
            b'N' | 0x88 | 0x89 | 0x97 => graph.push_leaf(),
            b'F' | b'I' | b'L' | b'S' | b'V' | b'P' => {
                cursor.line()?;
                graph.push_leaf();
            }
            b'K' | 0x82 => {
                cursor.take(1)?;
                graph.push_leaf();
            }
            b'M' | 0x83 => {
                cursor.take(2)?;
                graph.push_leaf();
            }
            b'J' | 0x84 => {
                cursor.take(4)?;
                graph.push_leaf();
            }
            b'G' => {
                cursor.take(8)?;
                graph.push_leaf();
            }
            b'U' | b'C' | 0x8a | 0x8c => {
                cursor.skip_prefixed(1)?;
                graph.push_leaf();
            }
            b'T' | b'X' | b'B' | 0x8b => {
                cursor.skip_prefixed(4)?;
                graph.push_leaf();
            }
            0x8d | 0x8e | 0x96 => {
                cursor.skip_prefixed(8)?;
                graph.push_leaf();
            }
            b'c' => {
                cursor.line()?;
                cursor.line()?;
                graph.push_leaf();
            }
            0x93 => {
                graph.pop_values(2)?;
                graph.push_leaf();
            }
            b'Q' => {
                graph.pop_value()?;
                graph.push_leaf();
            }

            // Containers.
            b'}' | b']' | b')' | 0x8f => graph.push_node(Vec::new()),
            b'd' | b'l' | b't' | 0x91 | b'o' => {
                let items = graph.pop_mark()?;
                graph.push_node(items);
            }
            b'i' => {
                cursor.line()?;
                cursor.line()?;
                let items = graph.pop_mark()?;
                graph.push_node(items);
            }
            // TUPLE1, TUPLE2, TUPLE3
            0x85..=0x87 => {
                let items = graph.pop_values(usize::from(op - 0x84))?;
                graph.push_node(items);
            }
            b'R' | 0x81 => {
                let items = graph.pop_values(2)?;
                graph.push_node(items);
            }
            0x92 => {
                let items = graph.pop_values(3)?;
                graph.push_node(items);
            }
            b'a' | b'b' => {
                let value = graph.pop_value()?;
                graph.extend_top(vec![value])?;
            }
            b's' => {
                let pair = graph.pop_values(2)?;
                graph.extend_top(pair)?;
            }
            b'e' | b'u' | 0x90 => {
                let items = graph.pop_mark()?;
                graph.extend_top(items)?;
            }

            // Stack and memo.
            b'0' => {
                graph.pop()?;
            }
            b'1' => {
                graph.pop_mark()?;
            }
            b'2' => {
                let top = graph.top()?;
                graph.stack.push(top);
            }
            b'p' => {
                let index = cursor.line_index()?;
                graph.memo_put(index)?;
            }
            b'q' => {
                let index = cursor.uint(1)?;
                graph.memo_put(index)?;
            }
            b'r' => {
                let index = cursor.uint(4)?;
                graph.memo_put(index)?;
            }
            0x94 => {
                let index = u64::try_from(graph.memo.len())
                    .map_err(|_| malformed("memo overflow"))?;
                graph.memo_put(index)?;
            }
            b'g' => {
                let index = cursor.line_index()?;
                graph.memo_get(index)?;
            }
            b'h' => {
                let index = cursor.uint(1)?;
                graph.memo_get(index)?;
            }
            b'j' => {
                let index = cursor.uint(4)?;
                graph.memo_get(index)?;
            }

            // Framing.
            0x80 => {
                cursor.take(1)?;
            }
            0x95 => {
                cursor.take(8)?;
            }
            0x98 => {
                graph.top()?;
            }

            _ => return Err(malformed(format!("unknown opcode 0x{op:02x}"))),
        }
    }

    match graph.stack.last() {
        Some(Slot::Node(root)) => graph.measure(*root),
        Some(Slot::Leaf) => Ok(()),
        Some(Slot::Mark) | None => Err(malformed("stream ended without a value")),
    }
}
