use crate::{FifoErr, FifoResult};

/// Storage word. Wide enough for any `width` up to 32 bits; values are never masked.
pub type Word = u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FifoConfig {
    pub depth: usize,
    /// Informational only.
    pub width: u32,
}

impl Default for FifoConfig {
    fn default() -> Self {
        Self { depth: 16, width: 8 }
    }
}

/// Control inputs sampled on one rising clock edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CycleInput {
    pub wr_en: bool,
    pub rd_en: bool,
    pub wdata: Word,
}

impl CycleInput {
    pub fn idle() -> Self {
        Self::default()
    }
    pub fn write(wdata: Word) -> Self {
        Self { wr_en: true, rd_en: false, wdata }
    }
    pub fn read() -> Self {
        Self { wr_en: false, rd_en: true, wdata: 0 }
    }
    pub fn read_write(wdata: Word) -> Self {
        Self { wr_en: true, rd_en: true, wdata }
    }
}

/// Register file of the FIFO at a clock edge boundary.
///
/// `full` and `empty` are derived from `count` on every commit; pointer
/// equality alone can't tell a full FIFO from an empty one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Registers {
    pub wptr: usize,
    pub rptr: usize,
    pub count: usize,
    pub rdata: Word,
    pub full: bool,
    pub empty: bool,
}

/// Everything one clock edge is going to change, computed from the
/// pre-edge state only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Transition {
    pub(crate) next: Registers,
    pub(crate) mem_write: Option<(usize, Word)>,
    pub(crate) wr_ok: bool,
    pub(crate) rd_ok: bool,
}

impl Registers {
    pub(crate) fn reset() -> Self {
        Self {
            wptr: 0,
            rptr: 0,
            count: 0,
            rdata: 0,
            full: false,
            empty: true,
        }
    }

    /// Pure next-state function. Both enables are qualified against the flags
    /// as they were before the edge, so a read and a write in the same cycle
    /// never observe each other. `depth` and `mem` must come from the
    /// owning [`FifoSync`].
    pub(crate) fn next(&self, depth: usize, mem: &[Word], input: &CycleInput) -> Transition {
        let wr_ok = input.wr_en && !self.full;
        let rd_ok = input.rd_en && !self.empty;

        let mut next = *self;
        let mut mem_write = None;

        if wr_ok {
            mem_write = Some((self.wptr, input.wdata));
            next.wptr = (self.wptr + 1) % depth;
            next.count += 1;
        }
        if rd_ok {
            next.rdata = mem[self.rptr];
            next.rptr = (self.rptr + 1) % depth;
            next.count -= 1;
        }
        next.full = next.count == depth;
        next.empty = next.count == 0;

        Transition {
            next,
            mem_write,
            wr_ok,
            rd_ok,
        }
    }
}

/// Synchronous single-clock FIFO with registered read data.
#[derive(Clone, Debug)]
pub struct FifoSync {
    depth: usize,
    width: u32,
    mem: Vec<Word>,
    regs: Registers,
}

impl FifoSync {
    pub fn new(config: FifoConfig) -> FifoResult<Self> {
        if config.depth == 0 {
            return Err(FifoErr::ZeroDepth);
        }
        Ok(Self {
            depth: config.depth,
            width: config.width,
            mem: vec![0; config.depth],
            regs: Registers::reset(),
        })
    }

    /// Advance one rising edge. Ineligible requests are dropped silently.
    pub fn cycle(&mut self, input: CycleInput) {
        self.step(input);
    }

    /// Like [`FifoSync::cycle`], but tells the caller which requests the
    /// edge accepted.
    pub(crate) fn step(&mut self, input: CycleInput) -> Transition {
        let t = self.regs.next(self.depth, &self.mem, &input);
        self.commit(t);
        t
    }

    fn commit(&mut self, t: Transition) {
        if let Some((addr, data)) = t.mem_write {
            self.mem[addr] = data;
        }
        self.regs = t.next;
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
    pub fn width(&self) -> u32 {
        self.width
    }
    pub fn registers(&self) -> Registers {
        self.regs
    }
    pub fn storage(&self) -> &[Word] {
        &self.mem
    }
    pub fn rdata(&self) -> Word {
        self.regs.rdata
    }
    pub fn full(&self) -> bool {
        self.regs.full
    }
    pub fn empty(&self) -> bool {
        self.regs.empty
    }
    pub fn count(&self) -> usize {
        self.regs.count
    }
    pub fn wptr(&self) -> usize {
        self.regs.wptr
    }
    pub fn rptr(&self) -> usize {
        self.regs.rptr
    }

    /// Flags agree with `count` and pointers are in range.
    pub fn is_consistent(&self) -> bool {
        let r = &self.regs;
        r.count <= self.depth
            && r.wptr < self.depth
            && r.rptr < self.depth
            && r.full == (r.count == self.depth)
            && r.empty == (r.count == 0)
    }
}
