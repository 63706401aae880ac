// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Property-based tests for translation and pool aliasing
//! OWNERS: @kernel-mm-team
//! NOTE: Tests only; no kernel logic.
//!
//! TEST_SCOPE:
//!   - Addresses outside every region never resolve and never touch memory
//!   - Mapped small pages resolve to frame | page offset
//!   - Non page-table L1 entries never resolve
//!   - Pool alias is affine inside the pool and absent outside
//!
//! TEST_SCENARIOS:
//!   - unclassified_addresses_do_not_resolve()
//!   - mapped_page_keeps_offset()
//!   - non_page_table_l1_does_not_resolve()
//!   - alias_is_affine_inside_pool()
//!   - alias_is_absent_outside_pool()

use proptest::prelude::*;

use super::descriptor::{L1Entry, L2Entry, PageAttrs};
use super::testing::{layout, pool, walker, RecordingCache, SimMemory, TableBuilder, POOL};
use super::{PAGE_MASK, PAGE_SIZE};
use crate::types::{PhysAddr, VirtAddr};

const POOL_START: u32 = POOL.phys_section + POOL.offset;
const POOL_END: u32 = POOL_START + POOL.size;

fn arb_user_va() -> impl Strategy<Value = VirtAddr> {
    // Code, data and heap each span 256 pages from their base.
    (prop_oneof![Just(0x8000_0000u32), Just(0x8010_0000), Just(0x8020_0000)], 0u32..0x10_0000)
        .prop_map(|(base, off)| VirtAddr::new(base + off))
}

fn arb_frame() -> impl Strategy<Value = PhysAddr> {
    (1u32..0x10_0000).prop_map(|pfn| PhysAddr::new(pfn << 12))
}

fn arb_l2_table() -> impl Strategy<Value = PhysAddr> {
    (0u32..(POOL.size >> 10)).prop_map(|slot| PhysAddr::new(POOL_START + (slot << 10)))
}

proptest! {
    #[test]
    fn unclassified_addresses_do_not_resolve(raw in any::<u32>()) {
        let (layout, pool) = (layout(), pool());
        let (memory, cache) = (SimMemory::default(), RecordingCache::default());
        let va = VirtAddr::new(raw);
        prop_assume!(layout.classify(va).is_none());

        let walker = walker(&layout, &pool, &memory, &cache);
        prop_assert_eq!(walker.translate(va), None);
        prop_assert_eq!(memory.reads(), 0);
    }

    #[test]
    fn mapped_page_keeps_offset(va in arb_user_va(), table in arb_l2_table(), frame in arb_frame()) {
        let (layout, pool) = (layout(), pool());
        let (memory, cache) = (SimMemory::default(), RecordingCache::default());
        TableBuilder::new(&memory, &pool).map_small(va, table, frame);

        let walker = walker(&layout, &pool, &memory, &cache);
        let expected = PhysAddr::new(frame.raw() | (va.raw() & PAGE_MASK));
        prop_assert_eq!(walker.translate(va), Some(expected));
        prop_assert_eq!(cache.ranges().len(), 1);
    }

    #[test]
    fn non_page_table_l1_does_not_resolve(va in arb_user_va(), word in any::<u32>(), frame in arb_frame()) {
        let l1 = L1Entry::from_raw(word);
        prop_assume!(l1.raw() & 0b11 != 0b01);
        let (layout, pool) = (layout(), pool());
        let (memory, cache) = (SimMemory::default(), RecordingCache::default());
        let builder = TableBuilder::new(&memory, &pool);
        builder.set_l1(va, l1);
        // A valid L2 word the walker must not reach.
        builder.set_l2(PhysAddr::new(POOL_START), va, L2Entry::small(frame, PageAttrs::USER_RW));

        let walker = walker(&layout, &pool, &memory, &cache);
        prop_assert_eq!(walker.translate(va), None);
        prop_assert!(cache.ranges().is_empty());
    }

    #[test]
    fn alias_is_affine_inside_pool(delta in 0u32..POOL.size) {
        let pa = PhysAddr::new(POOL_START + delta);
        let va = pool().phys_to_virt(pa);
        prop_assert_eq!(va, Some(VirtAddr::new(pa.raw() - POOL.phys_section + POOL.virt_section)));
    }

    #[test]
    fn alias_is_absent_outside_pool(raw in any::<u32>()) {
        prop_assume!(raw < POOL_START || raw >= POOL_END);
        prop_assert_eq!(pool().phys_to_virt(PhysAddr::new(raw)), None);
    }

    #[test]
    fn heap_descriptor_is_page_granular_for_aligned_boards(pages in 1u32..0x800) {
        let config = super::PoolConfig { size: pages * PAGE_SIZE as u32, ..POOL };
        let heap = super::PoolWindow::new(config).expect("valid pool").heap_descriptor();
        prop_assert!(heap.start.is_page_aligned());
        prop_assert_eq!(heap.size as usize % PAGE_SIZE, 0);
    }
}
