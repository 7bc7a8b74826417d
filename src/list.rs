//! Intrusive doubly linked list used for frequency buckets.
//!
//! Each bucket keeps its keys in the order they entered the bucket: new keys
//! are appended at the back and the eviction candidate is read from the front.
//! Callers hold on to the raw node pointer returned by [`List::push_back`] so
//! that an arbitrary key can later be unlinked in O(1).

extern crate alloc;

use alloc::boxed::Box;
use core::fmt;
use core::marker::PhantomData;
use core::mem;
use core::ptr;

/// A node in the doubly linked list.
///
/// Sentinel nodes leave `val` uninitialized; every other node owns a value.
pub struct Node<T> {
    val: mem::MaybeUninit<T>,
    prev: *mut Node<T>,
    next: *mut Node<T>,
}

impl<T> Node<T> {
    fn new(val: T) -> Self {
        Node {
            val: mem::MaybeUninit::new(val),
            prev: ptr::null_mut(),
            next: ptr::null_mut(),
        }
    }

    fn new_sigil() -> Self {
        Node {
            val: mem::MaybeUninit::uninit(),
            prev: ptr::null_mut(),
            next: ptr::null_mut(),
        }
    }

    /// Returns a reference to the value held by this node.
    ///
    /// # Safety
    ///
    /// Must only be called on non-sigil nodes.
    pub unsafe fn value(&self) -> &T {
        // SAFETY: caller guarantees this is not a sentinel, so `val` is initialized
        unsafe { self.val.assume_init_ref() }
    }
}

/// An insertion-ordered list with O(1) push-back, pop-front and unlink.
///
/// The list uses head and tail sentinel nodes so that linking and unlinking
/// never has to special-case the ends.
pub struct List<T> {
    len: usize,
    head: *mut Node<T>,
    tail: *mut Node<T>,
    _owns: PhantomData<Box<Node<T>>>,
}

impl<T> List<T> {
    /// Creates an empty list.
    pub fn new() -> List<T> {
        let head = Box::into_raw(Box::new(Node::new_sigil()));
        let tail = Box::into_raw(Box::new(Node::new_sigil()));

        // SAFETY: head and tail were just allocated and are valid
        unsafe {
            (*head).next = tail;
            (*tail).prev = head;
        }

        List {
            len: 0,
            head,
            tail,
            _owns: PhantomData,
        }
    }

    /// Returns the number of values in the list.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list holds no values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends a value at the back and returns the handle of its node.
    ///
    /// The handle stays valid until the node is removed through
    /// [`List::remove`] or [`List::pop_front`], or the list is dropped.
    pub fn push_back(&mut self, v: T) -> *mut Node<T> {
        let node = Box::into_raw(Box::new(Node::new(v)));
        // SAFETY: node is freshly allocated and not linked anywhere; tail is valid
        unsafe {
            (*node).next = self.tail;
            (*node).prev = (*self.tail).prev;
            (*(*self.tail).prev).next = node;
            (*self.tail).prev = node;
        }
        self.len += 1;
        node
    }

    /// Returns a reference to the oldest value, if any.
    pub fn front(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: the list is not empty, so head.next is a value node
        unsafe { Some((*(*self.head).next).value()) }
    }

    /// Removes and returns the oldest value, if any.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: the list is not empty, so head.next is a value node owned by this list
        unsafe {
            let first = (*self.head).next;
            Some(self.remove(first))
        }
    }

    /// Unlinks `node` from the list, frees it and returns its value.
    ///
    /// # Safety
    ///
    /// `node` must be a handle returned by [`List::push_back`] on this same
    /// list that has not been removed yet.
    pub unsafe fn remove(&mut self, node: *mut Node<T>) -> T {
        debug_assert!(!node.is_null() && node != self.head && node != self.tail);
        // SAFETY: caller guarantees node is a live value node of this list, so
        // its neighbours are valid and it was allocated through Box
        unsafe {
            (*(*node).prev).next = (*node).next;
            (*(*node).next).prev = (*node).prev;
            self.len -= 1;
            let boxed = Box::from_raw(node);
            boxed.val.assume_init()
        }
    }

    /// Iterates over the values from oldest to newest.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            // SAFETY: head is a valid sentinel for the lifetime of the list
            next: unsafe { (*self.head).next },
            tail: self.tail,
            _list: PhantomData,
        }
    }
}

impl<T> Default for List<T> {
    fn default() -> Self {
        List::new()
    }
}

impl<T> Drop for List<T> {
    fn drop(&mut self) {
        while self.pop_front().is_some() {}

        // SAFETY: the sentinels were allocated in `new` and are freed exactly once here
        unsafe {
            drop(Box::from_raw(self.head));
            drop(Box::from_raw(self.tail));
        }
    }
}

impl<T> fmt::Debug for List<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("List").field("len", &self.len).finish()
    }
}

/// Front-to-back iterator over a [`List`].
pub struct Iter<'a, T> {
    next: *mut Node<T>,
    tail: *mut Node<T>,
    _list: PhantomData<&'a List<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.next == self.tail {
            return None;
        }
        // SAFETY: every node between the sentinels is a live value node and the
        // list is borrowed for 'a, so it cannot be mutated meanwhile
        unsafe {
            let node = self.next;
            self.next = (*node).next;
            Some((*node).value())
        }
    }
}

impl<T> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter").finish()
    }
}
