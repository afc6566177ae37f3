use gamedata_core::Hash160;
use gamedata_format::{Container, Endian, NO_POINTERS, Platform, PointerMode, StreamPointer};

use super::finalize::chain_site;
use super::*;

fn open_unit(stream: &mut DataStream, name: &str) -> usize {
    let unit = stream.data_unit_index(Hash160::compute_str(name));
    stream.open_data_unit(unit);
    unit
}

/// Write a 4-byte leaf block holding `value`.
fn leaf(stream: &mut DataStream, value: u32) -> StreamReference {
    let r = stream.new_block(4);
    stream.open_block(r);
    stream.write_u32(value);
    stream.close_block();
    r
}

/// Write a block holding one reference per target.
fn parent(stream: &mut DataStream, targets: &[StreamReference]) -> StreamReference {
    let r = stream.new_block(8);
    stream.open_block(r);
    for &t in targets {
        stream.write_block_reference(t);
    }
    stream.close_block();
    r
}

#[test]
fn single_block_unit() {
    let mut stream = DataStream::new(Platform::Win64);
    open_unit(&mut stream, "root");
    let root = leaf(&mut stream, 5);
    stream.set_unit_root(root);
    stream.close_data_unit();

    let out = stream.finalize().unwrap();
    assert_eq!(out.units.len(), 1);
    assert_eq!(out.units[0].offset, 48);
    assert_eq!(out.units[0].size, 20);
    assert_eq!(out.bytes.len(), 68);

    let container = Container::from_bytes(&out.bytes).unwrap();
    let unit = container.unit(0).unwrap();
    assert_eq!(unit.root_offset(), Some(16));
    assert_eq!(unit.read_u32(16), 5);
    assert_eq!(unit.header().pointer_head, NO_POINTERS);
}

#[test]
fn identical_leaves_merge() {
    let mut stream = DataStream::new(Platform::Win64);
    open_unit(&mut stream, "root");
    let a = stream.new_block(4);
    let b = stream.new_block(4);
    let root = parent(&mut stream, &[a, b]);
    stream.set_unit_root(root);
    for r in [a, b] {
        stream.open_block(r);
        stream.write_u32(7);
        stream.close_block();
    }
    stream.close_data_unit();

    let out = stream.finalize().unwrap();
    assert_eq!(out.units[0].blocks, 2);
    assert_eq!(out.units[0].merged, 1);

    let container = Container::from_bytes(&out.bytes).unwrap();
    let unit = container.unit(0).unwrap();
    let root_at = unit.root_offset().unwrap();
    let first = unit.resolve(root_at).unwrap();
    let second = unit.resolve(root_at + 8).unwrap();
    assert_eq!(first, second);
    assert_eq!(unit.read_u32(first), 7);
}

#[test]
fn merging_reaches_fixed_point() {
    let mut stream = DataStream::new(Platform::Win64);
    open_unit(&mut stream, "root");
    let l1 = leaf(&mut stream, 3);
    let l2 = leaf(&mut stream, 3);
    let p1 = parent(&mut stream, &[l1]);
    let p2 = parent(&mut stream, &[l2]);
    let root = parent(&mut stream, &[p1, p2]);
    stream.set_unit_root(root);
    stream.close_data_unit();

    let out = stream.finalize().unwrap();
    assert_eq!(out.units[0].blocks, 3);
    assert_eq!(out.units[0].merged, 2);

    let container = Container::from_bytes(&out.bytes).unwrap();
    let unit = container.unit(0).unwrap();
    let root_at = unit.root_offset().unwrap();
    assert_eq!(unit.resolve(root_at), unit.resolve(root_at + 8));
}

#[test]
fn different_pointer_shape_does_not_merge() {
    let mut stream = DataStream::new(Platform::Win64);
    open_unit(&mut stream, "root");
    let target = leaf(&mut stream, 1);

    let with_site = parent(&mut stream, &[target]);
    let raw = stream.new_block(8);
    stream.open_block(raw);
    stream.write_i64(target.id() as i64);
    stream.close_block();

    let root = parent(&mut stream, &[with_site, raw]);
    stream.set_unit_root(root);
    stream.close_data_unit();

    let out = stream.finalize().unwrap();
    assert_eq!(out.units[0].merged, 0);
    assert_eq!(out.units[0].blocks, 4);
}

#[test]
fn different_alignment_does_not_merge() {
    let mut stream = DataStream::new(Platform::Win64);
    open_unit(&mut stream, "root");
    let narrow = stream.new_block(1);
    let wide = stream.new_block(8);
    for r in [narrow, wide] {
        stream.open_block(r);
        stream.write_bytes(&[1, 2, 3, 4]);
        stream.close_block();
    }
    stream.close_data_unit();

    let out = stream.finalize().unwrap();
    assert_eq!(out.units[0].merged, 0);
}

#[test]
fn blocks_land_on_their_alignment() {
    let mut stream = DataStream::new(Platform::Win64);
    open_unit(&mut stream, "root");
    let odd = stream.new_block(1);
    stream.open_block(odd);
    stream.write_bytes(b"xyz");
    stream.close_block();
    let wide = stream.new_block(16);
    stream.open_block(wide);
    stream.write_u64(1);
    stream.close_block();
    let small = leaf(&mut stream, 2);
    let root = parent(&mut stream, &[odd, wide, small]);
    stream.set_unit_root(root);
    stream.close_data_unit();

    let out = stream.finalize().unwrap();
    let container = Container::from_bytes(&out.bytes).unwrap();
    let unit = container.unit(0).unwrap();
    let root_at = unit.root_offset().unwrap();
    assert_eq!(root_at % 8, 0);

    let odd_at = unit.resolve(root_at).unwrap();
    let wide_at = unit.resolve(root_at + 8).unwrap();
    let small_at = unit.resolve(root_at + 16).unwrap();
    assert_eq!(odd_at, 16);
    assert_eq!(wide_at % 16, 0);
    assert_eq!(small_at % 4, 0);
    assert_eq!(unit.read_u64(wide_at), 1);
    assert_eq!(unit.read_u32(small_at), 2);
    assert_eq!(unit.record().offset % 16, 0);
}

#[test]
fn chained_sites_form_a_list() {
    let mut stream = DataStream::new(Platform::Win64);
    open_unit(&mut stream, "root");
    let a = leaf(&mut stream, 10);
    let b = leaf(&mut stream, 20);
    let root = parent(&mut stream, &[a, b, a]);
    stream.set_unit_root(root);
    stream.close_data_unit();

    let out = stream.finalize().unwrap();
    let container = Container::from_bytes(&out.bytes).unwrap();
    let unit = container.unit(0).unwrap();
    let root_at = unit.root_offset().unwrap();

    let pointers: Vec<StreamPointer> = unit.pointers().collect();
    assert_eq!(unit.header().pointer_count, 3);
    assert_eq!(unit.header().pointer_head, root_at);
    assert_eq!(
        pointers.iter().map(|p| p.position).collect::<Vec<_>>(),
        [root_at, root_at + 8, root_at + 16]
    );
    assert_eq!(unit.read_u32(pointers[0].target), 10);
    assert_eq!(unit.read_u32(pointers[1].target), 20);
    assert_eq!(pointers[2].target, pointers[0].target);

    // The last entry links to itself.
    assert_eq!(unit.read_i32(root_at + 16), 0);
}

#[test]
fn absolute_and_relative_sites() {
    for mode in [PointerMode::Absolute, PointerMode::Relative] {
        let mut stream = DataStream::new(Platform::Win64).with_pointer_mode(mode);
        open_unit(&mut stream, "root");
        let a = leaf(&mut stream, 10);
        let root = parent(&mut stream, &[a]);
        stream.set_unit_root(root);
        stream.close_data_unit();

        let out = stream.finalize().unwrap();
        let container = Container::from_bytes(&out.bytes).unwrap();
        assert_eq!(container.header().pointer_mode, mode);
        let unit = container.unit(0).unwrap();
        assert_eq!(unit.header().pointer_count, 0);

        let root_at = unit.root_offset().unwrap();
        let target = unit.resolve(root_at).unwrap();
        assert_eq!(target, 16);
        assert_eq!(unit.read_u32(target), 10);
        let raw = unit.read_u64(root_at);
        match mode {
            PointerMode::Absolute => assert_eq!(raw, 16),
            _ => assert_eq!(raw as i64, 16 - root_at as i64),
        }
    }
}

#[test]
fn mixed_modes_in_one_block() {
    let mut stream = DataStream::new(Platform::Win64);
    open_unit(&mut stream, "root");
    let a = leaf(&mut stream, 1);
    let root = stream.new_block(8);
    stream.open_block(root);
    stream.write_reference(a, PointerMode::Absolute);
    stream.write_reference(a, PointerMode::Chained);
    stream.close_block();
    stream.set_unit_root(root);
    stream.close_data_unit();

    let out = stream.finalize().unwrap();
    let container = Container::from_bytes(&out.bytes).unwrap();
    let unit = container.unit(0).unwrap();
    let root_at = unit.root_offset().unwrap();
    assert_eq!(unit.read_u64(root_at), 16);
    assert_eq!(unit.header().pointer_count, 1);
    assert_eq!(unit.header().pointer_head, root_at + 8);
}

#[test]
fn markers_resolve_inside_blocks() {
    let mut stream = DataStream::new(Platform::Win64);
    open_unit(&mut stream, "root");
    let hello = StreamReference::allocate();
    let world = StreamReference::allocate();
    let strings = stream.new_block(1);
    let root = parent(&mut stream, &[world, hello]);
    stream.open_block(strings);
    stream.mark(hello);
    stream.write_bytes(b"hello\0");
    stream.mark(world);
    stream.write_bytes(b"world\0");
    stream.close_block();
    stream.set_unit_root(root);
    stream.close_data_unit();

    let out = stream.finalize().unwrap();
    let container = Container::from_bytes(&out.bytes).unwrap();
    let unit = container.unit(0).unwrap();
    let root_at = unit.root_offset().unwrap();
    let world_at = unit.resolve(root_at).unwrap();
    let hello_at = unit.resolve(root_at + 8).unwrap();
    assert_eq!(unit.read_cstr(world_at), Some("world"));
    assert_eq!(unit.read_cstr(hello_at), Some("hello"));
}

#[test]
fn units_are_laid_out_independently() {
    let mut stream = DataStream::new(Platform::Win64);
    open_unit(&mut stream, "first");
    let a = leaf(&mut stream, 1);
    stream.set_unit_root(a);
    stream.close_data_unit();
    open_unit(&mut stream, "second");
    let b = leaf(&mut stream, 1);
    stream.set_unit_root(b);
    stream.close_data_unit();
    stream.data_unit_index(Hash160::compute_str("empty"));

    let out = stream.finalize().unwrap();
    assert_eq!(out.units.len(), 3);
    assert_eq!(out.units[0].signature, Hash160::compute_str("first"));
    assert_eq!(out.units[1].merged, 0);
    assert_eq!(out.units[2].blocks, 0);

    let container = Container::from_bytes(&out.bytes).unwrap();
    for unit in container.units() {
        assert_eq!(unit.record().offset % 16, 0);
    }
    assert_eq!(container.unit(1).unwrap().root_offset(), Some(16));
    assert_eq!(container.unit(2).unwrap().root_offset(), None);
}

#[test]
fn big_endian_container() {
    let mut stream = DataStream::new(Platform::BigEndian64);
    open_unit(&mut stream, "root");
    let a = leaf(&mut stream, 0x0102_0304);
    let root = parent(&mut stream, &[a]);
    stream.set_unit_root(root);
    stream.close_data_unit();

    let out = stream.finalize().unwrap();
    let container = Container::from_bytes(&out.bytes).unwrap();
    let unit = container.unit(0).unwrap();
    let target = unit.pointers().next().unwrap().target;
    assert_eq!(&unit.bytes()[target as usize..target as usize + 4], &[1, 2, 3, 4]);
}

#[test]
fn output_is_deterministic() {
    let build = || {
        let mut stream = DataStream::new(Platform::Win64);
        open_unit(&mut stream, "root");
        let l1 = leaf(&mut stream, 3);
        let l2 = leaf(&mut stream, 3);
        let l3 = leaf(&mut stream, 4);
        let root = parent(&mut stream, &[l1, l2, l3]);
        stream.set_unit_root(root);
        stream.close_data_unit();
        stream.finalize().unwrap().bytes
    };
    assert_eq!(build(), build());
}

#[test]
#[should_panic(expected = "dangling reference")]
fn dangling_reference_panics() {
    let mut stream = DataStream::new(Platform::Win64);
    open_unit(&mut stream, "root");
    parent(&mut stream, &[StreamReference::allocate()]);
    stream.close_data_unit();
    let _ = stream.finalize();
}

#[test]
#[should_panic(expected = "never written")]
fn unwritten_block_panics() {
    let mut stream = DataStream::new(Platform::Win64);
    open_unit(&mut stream, "root");
    let missing = stream.new_block(4);
    parent(&mut stream, &[missing]);
    stream.close_data_unit();
    let _ = stream.finalize();
}

#[test]
fn chain_links_out_of_range_are_rejected() {
    let site = StreamPointer::new(16, 48);
    assert_eq!(
        chain_site(&site, Some(40), Endian::Little),
        Ok(site.encode_chained(Some(40), Endian::Little).unwrap())
    );

    let far = u32::MAX - 8;
    assert_eq!(
        chain_site(&site, Some(far), Endian::Little),
        Err(StreamError::DeltaOverflow {
            position: 16,
            target: far,
        })
    );

    let high = StreamPointer::new(far, 16);
    assert_eq!(
        chain_site(&high, None, Endian::Big),
        Err(StreamError::DeltaOverflow {
            position: far,
            target: 16,
        })
    );
}
