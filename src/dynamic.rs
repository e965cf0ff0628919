/* ************************************************************************ **
** This file is part of rsp2, and is licensed under EITHER the MIT license  **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
**                                                                          **
** Be aware that not all of rsp2 is provided under this permissive license, **
** and that the project as a whole is licensed under the GPL 3.0.           **
** ************************************************************************ */

//! Heap storage for resizable vectors and matrices.
//!
//! Every mutator that allocates follows the same pattern: the replacement
//! buffer is built completely inside a guard (which cleans up after itself
//! if anything fails or panics), and only then committed into the container.

use crate::errors::{Error, Result};

use std::alloc::{self, Layout as AllocLayout};
use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::ptr::{self, NonNull};
use std::slice;

/// Allocation protocol used by [`DynBuf`].
///
/// There is no `self` anywhere in this trait, so a buffer cannot carry
/// per-instance allocator state; the implementing type is only ever used
/// as a marker, and buffers stay trivially movable.
///
/// # Safety
///
/// `allocate` must return either `None` or a pointer to a fresh block valid
/// for reads and writes of `layout.size()` bytes with the requested alignment,
/// and that block must remain valid until it is passed to `deallocate`.
pub unsafe trait RawAlloc: 'static {
    /// Allocate a block. `layout` never has zero size.
    fn allocate(layout: AllocLayout) -> Option<NonNull<u8>>;

    /// # Safety
    ///
    /// `ptr` must have been returned by `allocate` with the same `layout`,
    /// and must not be used afterwards.
    unsafe fn deallocate(ptr: NonNull<u8>, layout: AllocLayout);
}

/// The process allocator (`std::alloc`).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Global;

unsafe impl RawAlloc for Global {
    #[inline]
    fn allocate(layout: AllocLayout) -> Option<NonNull<u8>> {
        debug_assert_ne!(layout.size(), 0);
        NonNull::new(unsafe { alloc::alloc(layout) })
    }

    #[inline]
    unsafe fn deallocate(ptr: NonNull<u8>, layout: AllocLayout)
    { alloc::dealloc(ptr.as_ptr(), layout) }
}

// ---------------------------------------------------------------------------

/// An exclusively-owned, exactly-sized heap buffer.
///
/// An empty buffer holds a null pointer and owns no allocation.
/// `std::mem::take` moves the contents out and leaves exactly that behind.
pub struct DynBuf<X, A: RawAlloc = Global> {
    // None iff len == 0
    ptr: Option<NonNull<X>>,
    len: usize,
    _marker: PhantomData<(X, fn() -> A)>,
}

unsafe impl<X: Send, A: RawAlloc> Send for DynBuf<X, A> { }
unsafe impl<X: Sync, A: RawAlloc> Sync for DynBuf<X, A> { }

impl<X, A: RawAlloc> DynBuf<X, A> {
    /// An empty buffer. Does not allocate.
    #[inline]
    pub const fn new() -> Self
    { DynBuf { ptr: None, len: 0, _marker: PhantomData } }

    /// Build a buffer of `len` elements from a function on indices.
    ///
    /// If `f` panics, the elements produced so far are dropped and the
    /// allocation is released.
    pub fn from_fn<F>(len: usize, mut f: F) -> Result<Self>
    where F: FnMut(usize) -> X,
    {
        if len == 0 {
            return Ok(Self::new());
        }
        let mut partial = Partial::<X, A>::allocate(len)?;
        for i in 0..len {
            partial.push(f(i));
        }
        Ok(partial.finish())
    }

    /// A buffer of `len` default values.
    #[inline]
    pub fn with_len(len: usize) -> Result<Self>
    where X: Default,
    { Self::from_fn(len, |_| X::default()) }

    /// Deep copy of a slice.
    #[inline]
    pub fn from_slice(xs: &[X]) -> Result<Self>
    where X: Clone,
    { Self::from_fn(xs.len(), |i| xs[i].clone()) }

    /// Deep copy that reports allocation failure instead of aborting.
    #[inline]
    pub fn try_clone(&self) -> Result<Self>
    where X: Clone,
    { Self::from_slice(self.as_slice()) }

    #[inline(always)]
    pub fn len(&self) -> usize { self.len }

    #[inline(always)]
    pub fn is_empty(&self) -> bool { self.len == 0 }

    /// Raw pointer to the first element; null when empty.
    #[inline]
    pub fn as_ptr(&self) -> *const X {
        match self.ptr {
            Some(p) => p.as_ptr() as *const X,
            None => ptr::null(),
        }
    }

    /// Raw mutable pointer to the first element; null when empty.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut X {
        match self.ptr {
            Some(p) => p.as_ptr(),
            None => ptr::null_mut(),
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[X] {
        match self.ptr {
            // SAFETY: ptr holds `len` initialized elements that we own
            Some(p) => unsafe { slice::from_raw_parts(p.as_ptr(), self.len) },
            None => &[],
        }
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [X] {
        match self.ptr {
            // SAFETY: ptr holds `len` initialized elements that we own uniquely
            Some(p) => unsafe { slice::from_raw_parts_mut(p.as_ptr(), self.len) },
            None => &mut [],
        }
    }

    /// Change the number of elements, keeping the leading ones.
    ///
    /// The first `min(old, new)` elements are cloned into a fresh buffer and
    /// any new trailing elements are defaulted. Asking for the current length
    /// does nothing.
    ///
    /// Strong guarantee: if allocation fails (`Err`) or a `clone`/`default`
    /// panics, `self` is exactly as it was.
    pub fn resize(&mut self, len: usize) -> Result<()>
    where X: Clone + Default,
    {
        if len == self.len {
            return Ok(());
        }
        trace!("dynamic buffer: resize {} -> {} elements", self.len, len);

        let keep = len.min(self.len);
        let fresh = {
            let old = self.as_slice();
            Self::from_fn(len, |i| match i < keep {
                true => old[i].clone(),
                false => X::default(),
            })?
        };
        // commit; the old elements are dropped along with the buffer they live in
        *self = fresh;
        Ok(())
    }

    /// Change the number of elements, discarding the current contents.
    ///
    /// Every element afterwards is `X::default()`. Asking for the current
    /// length does nothing.
    ///
    /// Weak guarantee: a failed allocation (`Err`) leaves `self` untouched,
    /// but the old contents are dropped before the new buffer is filled, so
    /// a panicking `default` leaves `self` empty.
    pub fn resize_fast(&mut self, len: usize) -> Result<()>
    where X: Default,
    {
        if len == self.len {
            return Ok(());
        }
        trace!("dynamic buffer: resize_fast {} -> {} elements", self.len, len);

        if len == 0 {
            *self = Self::new();
            return Ok(());
        }
        let mut partial = Partial::<X, A>::allocate(len)?;
        *self = Self::new();
        while !partial.is_full() {
            partial.push(X::default());
        }
        *self = partial.finish();
        Ok(())
    }
}

impl<X, A: RawAlloc> Drop for DynBuf<X, A> {
    fn drop(&mut self) {
        if let Some(p) = self.ptr.take() {
            // SAFETY: we own `len` initialized elements in a block of capacity `len`
            unsafe {
                if mem::needs_drop::<X>() {
                    ptr::drop_in_place(ptr::slice_from_raw_parts_mut(p.as_ptr(), self.len));
                }
                release::<X, A>(p, self.len);
            }
        }
    }
}

impl<X, A: RawAlloc> Default for DynBuf<X, A> {
    #[inline]
    fn default() -> Self { Self::new() }
}

impl<X: Clone, A: RawAlloc> Clone for DynBuf<X, A> {
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(buf) => buf,
            Err(_) => on_alloc_failure::<X>(self.len),
        }
    }
}

impl<X, A: RawAlloc, const N: usize> From<[X; N]> for DynBuf<X, A> {
    fn from(array: [X; N]) -> Self {
        let mut iter = IntoIterator::into_iter(array);
        let built = Self::from_fn(N, |_| match iter.next() {
            Some(x) => x,
            None => unreachable!(),
        });
        match built {
            Ok(buf) => buf,
            Err(_) => on_alloc_failure::<X>(N),
        }
    }
}

impl<X, A: RawAlloc> Deref for DynBuf<X, A> {
    type Target = [X];

    #[inline(always)]
    fn deref(&self) -> &[X] { self.as_slice() }
}

impl<X, A: RawAlloc> DerefMut for DynBuf<X, A> {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut [X] { self.as_mut_slice() }
}

impl<X: PartialEq, A: RawAlloc> PartialEq for DynBuf<X, A> {
    #[inline]
    fn eq(&self, other: &Self) -> bool { self.as_slice() == other.as_slice() }
}

impl<X: Eq, A: RawAlloc> Eq for DynBuf<X, A> { }

impl<X: fmt::Debug, A: RawAlloc> fmt::Debug for DynBuf<X, A> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    { fmt::Debug::fmt(self.as_slice(), f) }
}

// ---------------------------------------------------------------------------

/// A buffer under construction.
///
/// Dropping it drops the elements written so far and releases the block.
struct Partial<X, A: RawAlloc> {
    ptr: NonNull<X>,
    cap: usize,
    init: usize,
    _marker: PhantomData<(X, fn() -> A)>,
}

impl<X, A: RawAlloc> Partial<X, A> {
    fn allocate(cap: usize) -> Result<Self> {
        debug_assert!(cap > 0);
        let ptr = match mem::size_of::<X>() {
            0 => NonNull::dangling(),
            _ => {
                let layout = AllocLayout::array::<X>(cap)
                    .map_err(|_| Error::allocation_failure::<X>(cap))?;
                A::allocate(layout)
                    .ok_or_else(|| Error::allocation_failure::<X>(cap))?
                    .cast::<X>()
            },
        };
        Ok(Partial { ptr, cap, init: 0, _marker: PhantomData })
    }

    #[inline(always)]
    fn is_full(&self) -> bool { self.init == self.cap }

    #[inline]
    fn push(&mut self, x: X) {
        assert!(!self.is_full());
        // SAFETY: in bounds of the block, and the slot is uninitialized
        unsafe { ptr::write(self.ptr.as_ptr().add(self.init), x) };
        self.init += 1;
    }

    fn finish(self) -> DynBuf<X, A> {
        assert!(self.is_full());
        let me = mem::ManuallyDrop::new(self);
        DynBuf { ptr: Some(me.ptr), len: me.cap, _marker: PhantomData }
    }
}

impl<X, A: RawAlloc> Drop for Partial<X, A> {
    fn drop(&mut self) {
        // SAFETY: exactly `init` leading elements were written
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.ptr.as_ptr(), self.init));
            release::<X, A>(self.ptr, self.cap);
        }
    }
}

/// # Safety
///
/// `ptr` must be a block of capacity `cap` obtained through `Partial::allocate`,
/// whose elements have already been dropped or moved out.
unsafe fn release<X, A: RawAlloc>(ptr: NonNull<X>, cap: usize) {
    if mem::size_of::<X>() != 0 {
        // this layout was successfully computed when the block was allocated
        let layout = AllocLayout::from_size_align_unchecked(
            mem::size_of::<X>() * cap,
            mem::align_of::<X>(),
        );
        A::deallocate(ptr.cast(), layout);
    }
}

/// Abort the way the standard collections do when they cannot allocate.
#[cold]
pub(crate) fn on_alloc_failure<X>(count: usize) -> ! {
    let layout = AllocLayout::array::<X>(count).unwrap_or_else(|_| AllocLayout::new::<X>());
    alloc::handle_alloc_error(layout)
}
