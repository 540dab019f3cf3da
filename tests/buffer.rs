use probe_table::Buffer;

#[test]
fn clone_matches_source_prefix() {
    let mut src: Buffer<String> = Buffer::with_size(6, 3);
    for i in 0..6 {
        src[i] = format!("s{}", i);
    }
    let copy = src.clone();
    assert_eq!(copy.capacity(), 6);
    assert_eq!(copy.size(), 3);
    assert_eq!(copy, src);
    for i in 0..3 {
        assert_eq!(copy[i], src[i]);
    }
    // Storage is distinct: mutating the copy leaves the source alone.
    let mut copy = copy;
    copy[0].push('!');
    assert_eq!(src[0], "s0");
    assert_ne!(copy, src);
}

#[test]
fn take_then_swap_back() {
    let mut a: Buffer<u32> = Buffer::with_size(4, 4);
    for i in 0..4 {
        a[i] = i as u32 * 10;
    }
    let mut moved = a.take();
    assert_eq!((a.capacity(), a.size()), (0, 0));
    assert_eq!(a, Buffer::default());

    a.swap(&mut moved);
    assert_eq!((a.capacity(), a.size()), (4, 4));
    assert_eq!(a.as_slice(), &[0, 10, 20, 30]);
    assert_eq!(moved.capacity(), 0);
}

#[test]
fn into_iter_yields_every_slot() {
    let mut b: Buffer<Option<u8>> = Buffer::new(3);
    b[1] = Some(7);
    let all: Vec<_> = b.into_iter().collect();
    assert_eq!(all, vec![None, Some(7), None]);
}
