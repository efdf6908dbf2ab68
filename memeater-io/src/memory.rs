use std::alloc::{alloc, Layout};
use std::mem;
use std::ptr::{self, NonNull};
use nix::errno::Errno;
use thiserror::Error;
use log::debug;

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("{} ({})", *.errno as i32, .errno.desc())]
    AllocationFailed { size: usize, errno: Errno },
    #[error("{} ({})", *.0 as i32, .0.desc())]
    LockFailed(Errno),
    #[error("invalid block layout for {0} bytes")]
    InvalidLayout(usize),
}

/// A block of eaten memory.
///
/// Blocks are never freed. They stay mapped until the process exits, which is
/// the point: the memory pressure only ever grows.
pub struct Block {
    ptr: NonNull<u8>,
    len: usize,
}

impl Block {
    /// Wraps memory that lives for the rest of the process.
    pub fn from_static(memory: &'static mut [u8]) -> Self {
        let len = memory.len();
        // SAFETY: slice pointers are never null.
        let ptr = unsafe { NonNull::new_unchecked(memory.as_mut_ptr()) };
        Self { ptr, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    /// Writes `byte` over the whole block, faulting every page in.
    pub fn fill(&mut self, byte: u8) {
        // SAFETY: ptr is valid for writes of `len` bytes for the life of the process.
        unsafe { ptr::write_bytes(self.ptr.as_ptr(), byte, self.len) }
    }
}

/// Where an allocation worker gets its memory from.
pub trait BlockSource {
    /// Pins all current and future pages of the process into RAM.
    fn pin_pages(&mut self) -> Result<(), MemoryError>;

    /// Requests exactly `size` bytes from the underlying allocator.
    fn allocate(&mut self, size: usize) -> Result<Block, MemoryError>;
}

/// The real thing: blocks straight from the global allocator, leaked on purpose.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeapSource;

impl HeapSource {
    pub fn new() -> Self {
        Self
    }
}

impl BlockSource for HeapSource {
    fn pin_pages(&mut self) -> Result<(), MemoryError> {
        crate::platform::lock_memory_pages()
    }

    fn allocate(&mut self, size: usize) -> Result<Block, MemoryError> {
        if size == 0 {
            return Err(MemoryError::InvalidLayout(size));
        }
        // Word alignment keeps the system allocator on the plain malloc() path,
        // which is what reports failures through errno.
        let layout = Layout::from_size_align(size, mem::align_of::<usize>())
            .map_err(|_| MemoryError::InvalidLayout(size))?;

        // SAFETY: layout has a non-zero size, checked above.
        let raw = unsafe { alloc(layout) };
        let Some(ptr) = NonNull::new(raw) else {
            // malloc() sets errno on failure; a stale zero still means out of memory.
            let errno = match Errno::last() {
                Errno::UnknownErrno => Errno::ENOMEM,
                errno => errno,
            };
            return Err(MemoryError::AllocationFailed { size, errno });
        };
        debug!("Allocated {} bytes at {:?}", size, ptr);

        // Never deallocated: the block stays valid until the process exits.
        Ok(Block { ptr, len: size })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heap_block_has_requested_size() {
        let mut source = HeapSource::new();
        let mut block = source.allocate(4096).unwrap();
        assert_eq!(block.len(), 4096);
        block.fill(0x5A);
        // SAFETY: the block was fully initialised by fill() and is never freed.
        let bytes = unsafe { std::slice::from_raw_parts(block.as_ptr(), block.len()) };
        assert!(bytes.iter().all(|&b| b == 0x5A));
    }

    #[test]
    fn test_static_block_wraps_slice() {
        let memory: &'static mut [u8] = Box::leak(vec![0u8; 64].into_boxed_slice());
        let mut block = Block::from_static(memory);
        assert_eq!(block.len(), 64);
        assert!(!block.is_empty());
        block.fill(7);
        // SAFETY: leaked above, valid for the rest of the test binary.
        let bytes = unsafe { std::slice::from_raw_parts(block.as_ptr(), 64) };
        assert_eq!(bytes, &[7u8; 64][..]);
    }

    #[test]
    fn test_zero_sized_block_is_rejected() {
        let mut source = HeapSource::new();
        assert!(matches!(source.allocate(0), Err(MemoryError::InvalidLayout(0))));
    }

    #[test]
    fn test_error_display_carries_errno() {
        let err = MemoryError::AllocationFailed { size: 4096, errno: Errno::ENOMEM };
        assert_eq!(err.to_string(), format!("{} ({})", libc::ENOMEM, Errno::ENOMEM.desc()));
    }
}
