use crate::error::Fault;

/// # Stack
/// Return addresses for subroutine calls, bounded to a fixed depth.
/// Overflowing or underflowing it is a fault rather than silently growing or
/// returning garbage.
#[derive(Clone, Debug)]
pub struct Stack {
    addresses: Vec<u16>,
    depth: usize,
}

impl Stack {
    pub fn new(depth: usize) -> Self {
        Stack {
            addresses: Vec::with_capacity(depth),
            depth,
        }
    }

    pub fn push(&mut self, addr: u16) -> Result<(), Fault> {
        if self.addresses.len() == self.depth {
            return Err(Fault::StackOverflow { depth: self.depth });
        }
        self.addresses.push(addr);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u16, Fault> {
        self.addresses.pop().ok_or(Fault::StackUnderflow)
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}
