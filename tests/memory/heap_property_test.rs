/*!
 * Heap Property Tests
 * Invariants over random allocation, release and compaction sequences
 */

use alloc_sim::core::id::PidGenerator;
use alloc_sim::core::types::Size;
use alloc_sim::{AllocationStrategy, Heap, Process};
use proptest::prelude::*;
use std::collections::HashSet;

#[derive(Debug, Clone)]
enum Op {
    Allocate {
        size: Size,
        best_fit: bool,
        fragmentation: bool,
    },
    Release(usize),
    Compact,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (1usize..300, any::<bool>(), any::<bool>()).prop_map(|(size, best_fit, fragmentation)| {
            Op::Allocate { size, best_fit, fragmentation }
        }),
        3 => (0usize..64).prop_map(Op::Release),
        1 => Just(Op::Compact),
    ]
}

fn strategy(best_fit: bool) -> AllocationStrategy {
    if best_fit {
        AllocationStrategy::BestFit
    } else {
        AllocationStrategy::FirstFit
    }
}

fn check_invariants(heap: &Heap, processes: &[Process]) -> Result<(), TestCaseError> {
    let sum: Size = heap.iter().map(|b| b.size()).sum();
    prop_assert_eq!(sum + heap.overhead() * heap.splits(), heap.total_capacity());

    let external = heap.external_fragmentation();
    prop_assert!(external <= heap.total_capacity());

    // Every occupied block points at exactly one live, allocated process
    let mut seen = HashSet::new();
    for block in heap.iter().filter(|b| !b.is_free()) {
        let pid = block.occupant().unwrap();
        prop_assert!(seen.insert(pid), "PID {} occupies two blocks", pid);
        let owner = processes.iter().find(|p| p.id() == pid);
        prop_assert!(owner.is_some(), "block {} held by unknown PID {}", block.id(), pid);
        prop_assert_eq!(owner.unwrap().allocated_block(), Some(block.id()));
    }
    for process in processes.iter().filter(|p| p.is_allocated()) {
        let block = heap.block(process.allocated_block().unwrap());
        prop_assert!(block.is_some());
        prop_assert_eq!(block.unwrap().occupant(), Some(process.id()));
    }

    // Links agree in both directions
    let forward: Vec<_> = heap.iter().map(|b| b.id()).collect();
    prop_assert_eq!(forward.len(), heap.len());
    for pair in forward.windows(2) {
        prop_assert_eq!(heap.block(pair[1]).unwrap().prev(), Some(pair[0]));
    }
    Ok(())
}

proptest! {
    #[test]
    fn prop_heap_invariants_hold(
        sizes in prop::collection::vec(1usize..500, 1..8),
        overhead in 0usize..16,
        ops in prop::collection::vec(op(), 1..60),
    ) {
        let ids = PidGenerator::default_start();
        let mut heap = Heap::initialize(&sizes, overhead);
        let mut processes: Vec<Process> = Vec::new();

        for op in ops {
            match op {
                Op::Allocate { size, best_fit, fragmentation } => {
                    let mut process = Process::new(&ids, size, 1).unwrap();
                    let grant = heap
                        .request_allocation(&mut process, strategy(best_fit), fragmentation)
                        .unwrap();
                    if let Some(grant) = grant {
                        let block = heap.block(grant.block).unwrap();
                        prop_assert!(block.size() >= size);
                        if grant.split {
                            prop_assert_eq!(block.size(), size);
                        }
                        processes.push(process);
                    }
                }
                Op::Release(index) => {
                    if !processes.is_empty() {
                        let mut process = processes.remove(index % processes.len());
                        let block_size = heap.block(process.allocated_block().unwrap()).unwrap().size();
                        let before = heap.external_fragmentation();
                        let delta = heap.deallocate_process(&mut process).unwrap();
                        prop_assert_eq!(delta, block_size - process.size());
                        prop_assert_eq!(heap.external_fragmentation(), before + block_size);
                    }
                }
                Op::Compact => {
                    let free_before = heap.external_fragmentation();
                    let occupied_before: Vec<_> = heap
                        .iter()
                        .filter(|b| !b.is_free())
                        .map(|b| b.id())
                        .collect();

                    prop_assert_eq!(heap.compact(), free_before);

                    let head = heap.block(heap.head().unwrap()).unwrap();
                    prop_assert!(head.is_free());
                    prop_assert_eq!(head.size(), free_before);
                    prop_assert_eq!(heap.stats().free_blocks, 1);
                    let occupied_after: Vec<_> = heap
                        .iter()
                        .filter(|b| !b.is_free())
                        .map(|b| b.id())
                        .collect();
                    prop_assert_eq!(occupied_after, occupied_before);
                }
            }
            check_invariants(&heap, &processes)?;
        }
    }

    #[test]
    fn prop_first_fit_takes_earliest_fitting_block(
        sizes in prop::collection::vec(1usize..500, 1..10),
        request in 1usize..500,
    ) {
        let ids = PidGenerator::default_start();
        let mut heap = Heap::initialize(&sizes, 0);
        let expected = heap.iter().find(|b| b.size() >= request).map(|b| b.id());
        let mut process = Process::new(&ids, request, 1).unwrap();

        let grant = heap
            .request_allocation(&mut process, AllocationStrategy::FirstFit, true)
            .unwrap();

        prop_assert_eq!(grant.map(|g| g.block), expected);
    }

    #[test]
    fn prop_best_fit_takes_smallest_earliest_block(
        sizes in prop::collection::vec(1usize..500, 1..10),
        request in 1usize..500,
    ) {
        let ids = PidGenerator::default_start();
        let mut heap = Heap::initialize(&sizes, 0);
        let smallest = heap
            .iter()
            .filter(|b| b.size() >= request)
            .map(|b| b.size())
            .min();
        let expected = smallest
            .and_then(|min| heap.iter().find(|b| b.size() == min))
            .map(|b| b.id());
        let mut process = Process::new(&ids, request, 1).unwrap();

        let grant = heap
            .request_allocation(&mut process, AllocationStrategy::BestFit, true)
            .unwrap();

        prop_assert_eq!(grant.map(|g| g.block), expected);
    }
}
