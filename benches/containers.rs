//! Microbenchmarks for the container engines.
//!
//! Run with: cargo bench
//!
//! Storage is pre-allocated once per group; each iteration fills and
//! drains so slot reuse is exercised the way long-running callers do.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use anchor_collections::{
    AvlTree, BoundedStorage, BoxedHashStorage, BoxedStorage, BoxedTreeStorage, FixedHashMap, Key,
    Linked, List, Storage,
};

const N: usize = 10_000;

// ============================================================================
// List
// ============================================================================

#[derive(Debug)]
struct Record {
    value: u64,
    next: u32,
    prev: u32,
}

impl Record {
    fn new(value: u64) -> Self {
        Self {
            value,
            next: u32::NONE,
            prev: u32::NONE,
        }
    }
}

impl Linked<u32> for Record {
    fn next(&self) -> u32 {
        self.next
    }
    fn prev(&self) -> u32 {
        self.prev
    }
    fn set_next(&mut self, idx: u32) {
        self.next = idx;
    }
    fn set_prev(&mut self, idx: u32) {
        self.prev = idx;
    }
}

fn bench_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("list");
    group.throughput(Throughput::Elements(N as u64));

    let mut storage: BoxedStorage<Record> = BoxedStorage::with_capacity(N);

    group.bench_function("push_back_pop_front", |b| {
        b.iter(|| {
            let mut list: List<u32> = List::new();
            for i in 0..N as u64 {
                let idx = storage.try_insert(Record::new(i)).unwrap();
                list.push_back(&mut storage, idx);
            }
            let mut sum = 0u64;
            loop {
                let idx = list.pop_front(&mut storage);
                if idx.is_none() {
                    break;
                }
                sum += storage.remove(idx).unwrap().value;
            }
            black_box(sum)
        });
    });

    group.bench_function("remove_from_middle", |b| {
        b.iter(|| {
            let mut list: List<u32> = List::new();
            let keys: Vec<u32> = (0..N as u64)
                .map(|i| {
                    let idx = storage.try_insert(Record::new(i)).unwrap();
                    list.push_back(&mut storage, idx);
                    idx
                })
                .collect();
            for &idx in &keys {
                list.remove(&mut storage, idx);
                storage.remove(idx);
            }
        });
    });

    group.finish();
}

// ============================================================================
// Hash map
// ============================================================================

fn bench_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("hash");
    group.throughput(Throughput::Elements(N as u64));

    let mut storage: BoxedHashStorage<u64, u64> = BoxedHashStorage::with_capacity(N);

    group.bench_function("insert_remove", |b| {
        b.iter(|| {
            let mut map: FixedHashMap<u64, u64, _> = FixedHashMap::with_buckets(N);
            for k in 0..N as u64 {
                map.try_insert(&mut storage, k, k).unwrap();
            }
            for k in 0..N as u64 {
                map.remove(&mut storage, &k);
            }
        });
    });

    let mut map: FixedHashMap<u64, u64, _> = FixedHashMap::with_buckets(N);
    for k in 0..N as u64 {
        map.try_insert(&mut storage, k, k).unwrap();
    }

    group.bench_function("find", |b| {
        b.iter(|| {
            let mut sum = 0u64;
            for k in 0..N as u64 {
                sum += *map.get(&storage, &k).unwrap();
            }
            black_box(sum)
        });
    });

    group.finish();
}

// ============================================================================
// AVL tree
// ============================================================================

fn bench_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree");
    group.throughput(Throughput::Elements(N as u64));

    let mut storage: BoxedTreeStorage<u64, u64> = BoxedTreeStorage::with_capacity(N);

    group.bench_function("insert_remove", |b| {
        b.iter(|| {
            let mut tree: AvlTree<u64, u64, _> = AvlTree::new();
            for k in 0..N as u64 {
                tree.try_insert(&mut storage, k, k).unwrap();
            }
            for k in 0..N as u64 {
                tree.remove(&mut storage, &k);
            }
        });
    });

    let mut tree: AvlTree<u64, u64, _> = AvlTree::new();
    for k in 0..N as u64 {
        tree.try_insert(&mut storage, k, k).unwrap();
    }

    group.bench_function("find", |b| {
        b.iter(|| {
            let mut sum = 0u64;
            for k in 0..N as u64 {
                sum += *tree.get(&storage, &k).unwrap();
            }
            black_box(sum)
        });
    });

    group.bench_function("floor_query", |b| {
        b.iter(|| {
            let mut hits = 0usize;
            for k in 0..N as u64 {
                if tree.find_le(&storage, &k).is_some() {
                    hits += 1;
                }
            }
            black_box(hits)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_list, bench_hash, bench_tree);
criterion_main!(benches);
