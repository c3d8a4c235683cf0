/*!
 * Heap Scenario Tests
 * Placement, partitioning, release and compaction on the classic layout
 */

use alloc_sim::core::id::PidGenerator;
use alloc_sim::core::types::Size;
use alloc_sim::{AllocationStrategy, BlockState, Heap, HeapError, Process};
use pretty_assertions::assert_eq;

const CLASSIC: [Size; 6] = [450, 150, 70, 50, 300, 200];

/// (size, occupied, from_split) head to tail
fn layout(heap: &Heap) -> Vec<(Size, bool, bool)> {
    heap.iter()
        .map(|b| (b.size(), !b.is_free(), b.from_split()))
        .collect()
}

fn capacity_holds(heap: &Heap) -> bool {
    let sum: Size = heap.iter().map(|b| b.size()).sum();
    sum + heap.overhead() * heap.splits() == heap.total_capacity()
}

#[test]
fn test_construction_reverses_declared_order() {
    let heap = Heap::initialize(&CLASSIC, 0);

    assert_eq!(
        heap.iter().map(|b| b.size()).collect::<Vec<_>>(),
        vec![200, 300, 50, 70, 150, 450]
    );
    assert_eq!(heap.total_capacity(), 1220);
    assert_eq!(heap.external_fragmentation(), 1220);
    assert!(heap.iter().all(|b| b.state() == BlockState::Free && !b.from_split()));
}

#[test]
fn test_first_fit_splits_head_block() {
    let ids = PidGenerator::default_start();
    let mut heap = Heap::initialize(&CLASSIC, 0);
    let mut process = Process::new(&ids, 60, 3).unwrap();

    let grant = heap
        .request_allocation(&mut process, AllocationStrategy::FirstFit, false)
        .unwrap()
        .expect("200 fits 60");

    assert!(grant.split);
    assert_eq!(grant.internal_fragmentation, 0);
    assert_eq!(
        layout(&heap),
        vec![
            (60, true, false),
            (140, false, true),
            (300, false, false),
            (50, false, false),
            (70, false, false),
            (150, false, false),
            (450, false, false),
        ]
    );
    assert_eq!(process.allocated_block(), Some(grant.block));
    assert_eq!(heap.block(grant.block).unwrap().occupant(), Some(process.id()));
    assert!(capacity_holds(&heap));
}

#[test]
fn test_best_fit_picks_smallest_fitting_block() {
    let ids = PidGenerator::default_start();
    let mut heap = Heap::initialize(&CLASSIC, 0);
    let mut process = Process::new(&ids, 60, 3).unwrap();

    heap.request_allocation(&mut process, AllocationStrategy::BestFit, false)
        .unwrap()
        .unwrap();

    assert_eq!(
        layout(&heap),
        vec![
            (200, false, false),
            (300, false, false),
            (50, false, false),
            (60, true, false),
            (10, false, true),
            (150, false, false),
            (450, false, false),
        ]
    );
}

#[test]
fn test_best_fit_ties_keep_earliest_block() {
    let ids = PidGenerator::default_start();
    // Head to tail: 80, 100, 80
    let mut heap = Heap::initialize(&[80, 100, 80], 0);
    let head = heap.head().unwrap();
    let mut process = Process::new(&ids, 80, 1).unwrap();

    let grant = heap
        .request_allocation(&mut process, AllocationStrategy::BestFit, false)
        .unwrap()
        .unwrap();

    assert_eq!(grant.block, head);
    assert!(!grant.split);
}

#[test]
fn test_fragmentation_mode_grants_whole_block() {
    let ids = PidGenerator::default_start();
    let mut heap = Heap::initialize(&CLASSIC, 0);
    let mut process = Process::new(&ids, 60, 3).unwrap();

    let grant = heap
        .request_allocation(&mut process, AllocationStrategy::FirstFit, true)
        .unwrap()
        .unwrap();

    assert!(!grant.split);
    assert_eq!(grant.internal_fragmentation, 140);
    assert_eq!(heap.len(), 6);
    assert_eq!(heap.block(grant.block).unwrap().size(), 200);
    assert_eq!(heap.external_fragmentation(), 1020);
}

#[test]
fn test_deallocation_after_split_frees_exact_size() {
    let ids = PidGenerator::default_start();
    let mut heap = Heap::initialize(&CLASSIC, 0);
    let mut process = Process::new(&ids, 60, 3).unwrap();
    heap.request_allocation(&mut process, AllocationStrategy::FirstFit, false)
        .unwrap()
        .unwrap();
    let before = heap.external_fragmentation();

    let delta = heap.deallocate_process(&mut process).unwrap();

    assert_eq!(delta, 0);
    assert_eq!(heap.external_fragmentation(), before + 60);
    assert!(!process.is_allocated());
    // Freed blocks are not merged with their neighbours
    assert_eq!(heap.len(), 7);
}

#[test]
fn test_deallocation_in_fragmentation_mode_returns_unused_space() {
    let ids = PidGenerator::default_start();
    let mut heap = Heap::initialize(&CLASSIC, 0);
    let mut process = Process::new(&ids, 60, 3).unwrap();
    heap.request_allocation(&mut process, AllocationStrategy::FirstFit, true)
        .unwrap()
        .unwrap();

    assert_eq!(heap.deallocate_process(&mut process).unwrap(), 140);
    assert_eq!(heap.external_fragmentation(), 1220);
}

#[test]
fn test_oversized_request_waits() {
    let ids = PidGenerator::default_start();
    let mut heap = Heap::initialize(&CLASSIC, 0);
    let mut process = Process::new(&ids, 5000, 3).unwrap();

    let grant = heap
        .request_allocation(&mut process, AllocationStrategy::BestFit, false)
        .unwrap();

    assert!(grant.is_none());
    assert!(!process.is_allocated());
    assert_eq!(heap.external_fragmentation(), 1220);
}

#[test]
fn test_split_overhead_is_charged_once() {
    let ids = PidGenerator::default_start();
    let mut heap = Heap::initialize(&CLASSIC, 8);
    let mut process = Process::new(&ids, 60, 3).unwrap();

    heap.request_allocation(&mut process, AllocationStrategy::FirstFit, false)
        .unwrap()
        .unwrap();

    assert_eq!(heap.iter().nth(1).unwrap().size(), 132);
    assert_eq!(heap.splits(), 1);
    assert!(capacity_holds(&heap));
}

#[test]
fn test_leftover_within_overhead_is_not_split() {
    let ids = PidGenerator::default_start();
    let mut heap = Heap::initialize(&[64], 8);
    let mut process = Process::new(&ids, 60, 3).unwrap();

    let grant = heap
        .request_allocation(&mut process, AllocationStrategy::FirstFit, false)
        .unwrap()
        .unwrap();

    assert!(!grant.split);
    assert_eq!(heap.len(), 1);
    assert_eq!(heap.block(grant.block).unwrap().size(), 64);
}

#[test]
fn test_precondition_violations_are_errors() {
    let ids = PidGenerator::default_start();
    let mut heap = Heap::initialize(&CLASSIC, 0);
    let mut process = Process::new(&ids, 60, 3).unwrap();

    assert_eq!(
        heap.deallocate_process(&mut process),
        Err(HeapError::NotAllocated(process.id()))
    );

    let grant = heap
        .request_allocation(&mut process, AllocationStrategy::FirstFit, false)
        .unwrap()
        .unwrap();
    assert_eq!(
        heap.request_allocation(&mut process, AllocationStrategy::FirstFit, false),
        Err(HeapError::AlreadyAllocated {
            pid: process.id(),
            block: grant.block,
        })
    );
}

#[test]
fn test_compaction_gathers_free_space_at_head() {
    let ids = PidGenerator::default_start();
    let mut heap = Heap::initialize(&CLASSIC, 0);
    let mut a = Process::new(&ids, 60, 3).unwrap();
    let mut b = Process::new(&ids, 100, 3).unwrap();
    heap.request_allocation(&mut a, AllocationStrategy::FirstFit, false)
        .unwrap()
        .unwrap();
    heap.request_allocation(&mut b, AllocationStrategy::FirstFit, false)
        .unwrap()
        .unwrap();
    let free_before = heap.external_fragmentation();

    let reclaimed = heap.compact();

    assert_eq!(reclaimed, free_before);
    assert_eq!(
        layout(&heap),
        vec![(free_before, false, false), (60, true, false), (100, true, true)]
    );
    assert_eq!(heap.total_capacity(), 1220);
    assert_eq!(heap.stats().free_blocks, 1);
    assert!(capacity_holds(&heap));

    // Back-references survive compaction
    for process in [&a, &b] {
        let block = heap.block(process.allocated_block().unwrap()).unwrap();
        assert_eq!(block.occupant(), Some(process.id()));
    }
}

#[test]
fn test_compaction_lets_waiting_request_fit() {
    let ids = PidGenerator::default_start();
    // Head to tail: 100, 100, 100
    let mut heap = Heap::initialize(&[100, 100, 100], 0);
    let mut pinned = Process::new(&ids, 100, 3).unwrap();
    let mut left = Process::new(&ids, 100, 3).unwrap();
    heap.request_allocation(&mut left, AllocationStrategy::FirstFit, false)
        .unwrap()
        .unwrap();
    heap.request_allocation(&mut pinned, AllocationStrategy::FirstFit, false)
        .unwrap()
        .unwrap();
    heap.deallocate_process(&mut left).unwrap();

    let mut big = Process::new(&ids, 200, 3).unwrap();
    assert!(heap
        .request_allocation(&mut big, AllocationStrategy::FirstFit, false)
        .unwrap()
        .is_none());

    assert_eq!(heap.compact(), 200);
    assert!(heap
        .request_allocation(&mut big, AllocationStrategy::FirstFit, false)
        .unwrap()
        .is_some());
    assert_eq!(heap.external_fragmentation(), 0);
}

#[test]
fn test_snapshot_reports_occupants() {
    let ids = PidGenerator::default_start();
    let mut heap = Heap::initialize(&CLASSIC, 0);
    let mut process = Process::new(&ids, 60, 3).unwrap();
    heap.request_allocation(&mut process, AllocationStrategy::FirstFit, false)
        .unwrap()
        .unwrap();

    let snapshot = heap.snapshot();

    assert_eq!(snapshot.len(), 7);
    assert_eq!(snapshot[0].process_id, Some(process.id()));
    assert!(snapshot[1].from_split);
    assert!(snapshot[1..].iter().all(|b| b.process_id.is_none()));
    assert_eq!(heap.to_string(), "[| 60*1 | 140 | 300 | 50 | 70 | 150 | 450 |]");
}
