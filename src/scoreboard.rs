use std::collections::VecDeque;

/// Outcome of comparing one observed value against the golden queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compare<T> {
    Match(T),
    Mismatch { expected: T, received: T },
    /// Something was received while nothing was expected.
    Unexpected(T),
}

/// Golden reference queue. Expected values are pushed on every accepted
/// write, and each observed read pops the oldest one for comparison.
#[derive(Debug, Clone)]
pub struct Scoreboard<T>
where
    T: PartialEq,
{
    exp_q: VecDeque<T>,
    errors: u32,
    expected: u32,
    received: u32,
    matched: u32,
}

impl<T> Scoreboard<T>
where
    T: PartialEq + Copy,
{
    pub fn new() -> Self {
        Scoreboard {
            exp_q: VecDeque::new(),
            errors: 0,
            expected: 0,
            received: 0,
            matched: 0,
        }
    }

    pub fn add_exp(&mut self, data: T) {
        self.exp_q.push_back(data);
        self.expected += 1;
    }

    pub fn add_recv(&mut self, data: T) -> Compare<T> {
        self.received += 1;
        let cmp = match self.exp_q.pop_front() {
            Some(exp) if exp == data => Compare::Match(exp),
            Some(exp) => Compare::Mismatch {
                expected: exp,
                received: data,
            },
            None => Compare::Unexpected(data),
        };
        match cmp {
            Compare::Match(_) => self.matched += 1,
            _ => self.errors += 1,
        }
        cmp
    }

    pub fn len(&self) -> usize {
        self.exp_q.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exp_q.is_empty()
    }

    pub fn errors(&self) -> u32 {
        self.errors
    }

    pub fn passed(&self) -> bool {
        self.expected > 0
            && self.received == self.expected
            && self.matched == self.received
            && self.errors == 0
            && self.exp_q.is_empty()
    }

    pub fn result_str(&self) -> String {
        format!(
            "expected={}, received={}, matched={}, errors={}, expQ: {}",
            self.expected,
            self.received,
            self.matched,
            self.errors,
            self.exp_q.len()
        )
    }
}

impl<T: PartialEq + Copy> Default for Scoreboard<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_in_order() {
        let mut sb = Scoreboard::new();
        sb.add_exp(1u32);
        sb.add_exp(2);
        assert_eq!(sb.add_recv(1), Compare::Match(1));
        assert_eq!(sb.add_recv(2), Compare::Match(2));
        assert!(sb.passed());
        assert_eq!(
            sb.result_str(),
            "expected=2, received=2, matched=2, errors=0, expQ: 0"
        );
    }

    #[test]
    fn counts_mismatch_and_unexpected() {
        let mut sb = Scoreboard::new();
        sb.add_exp(1u32);
        assert_eq!(
            sb.add_recv(9),
            Compare::Mismatch {
                expected: 1,
                received: 9
            }
        );
        assert_eq!(sb.add_recv(3), Compare::Unexpected(3));
        assert_eq!(sb.errors(), 2);
        assert!(!sb.passed());
    }

    #[test]
    fn empty_scoreboard_does_not_pass() {
        let sb: Scoreboard<u32> = Scoreboard::new();
        assert!(!sb.passed());
        assert!(sb.is_empty());
    }
}
