mod util;
use util::*;

use bytemuck::{Pod, Zeroable, cast_slice};
use dist_coloring::algs::communicator::{CommTag, Communicator, NoComm, ThreadComm, Wait};

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable, Debug, PartialEq, Eq)]
struct WireU64 {
    x: u64,
}

#[test]
fn no_comm_is_nop() {
    let comm = NoComm;
    assert_eq!((comm.rank(), comm.size()), (0, 1));
    let mut buf = [0u8; 8];
    let h = comm.irecv(0, 123, &mut buf);
    assert!(h.wait().is_none());
    let s = comm.isend(0, 123, &[]);
    assert!(s.wait().is_none());
}

#[test]
fn thread_fifo_order() {
    let tag = CommTag(0x1001);
    let world = ThreadComm::world(2);
    let (c0, c1) = (&world[0], &world[1]);

    for i in 0..10u8 {
        c0.isend(1, tag.as_u16(), &[i]);
    }
    let mut out = Vec::new();
    for _ in 0..10 {
        let mut b = [0u8; 1];
        let h = c1.irecv(0, tag.as_u16(), &mut b);
        out.push(h.wait().unwrap()[0]);
    }
    assert_eq!(out, (0u8..10u8).collect::<Vec<_>>());
}

#[test]
fn truncation_is_ok() {
    let tag = CommTag(0x1002);
    let world = ThreadComm::world(2);
    world[0].isend(1, tag.as_u16(), &[1, 2, 3, 4, 5, 6]);
    let mut b = [0u8; 4];
    let got = world[1].irecv(0, tag.as_u16(), &mut b).wait().unwrap();
    assert_eq!(got, vec![1, 2, 3, 4]);
}

#[test]
fn thread_comm_tag_isolation() {
    let world = ThreadComm::world(2);
    let (c0, c1) = (&world[0], &world[1]);

    const TAG_A: u16 = 0xA100;
    const TAG_B: u16 = 0xB200;

    let mut buf_a = [0u8; core::mem::size_of::<WireU64>()];
    let mut buf_b = [0u8; core::mem::size_of::<WireU64>()];
    let rxa = c1.irecv(0, TAG_A, &mut buf_a);
    let rxb = c1.irecv(0, TAG_B, &mut buf_b);

    let wa = [WireU64 { x: 0xDEAD_BEEF_F00D_F00D }];
    let wb = [WireU64 { x: 0x0123_4567_89AB_CDEF }];
    c0.isend(1, TAG_B, cast_slice(&wb));
    c0.isend(1, TAG_A, cast_slice(&wa));

    assert_eq!(&rxa.wait().expect("rxa")[..], cast_slice(&wa));
    assert_eq!(&rxb.wait().expect("rxb")[..], cast_slice(&wb));
}

#[test]
fn worlds_do_not_share_mailboxes() {
    let a = ThreadComm::world(2);
    let b = ThreadComm::world(2);
    a[0].isend(1, 5, &[1]);
    b[0].isend(1, 5, &[2]);
    let mut buf = [0u8; 1];
    assert_eq!(b[1].irecv(0, 5, &mut buf).wait().unwrap(), vec![2]);
    assert_eq!(a[1].irecv(0, 5, &mut buf).wait().unwrap(), vec![1]);
}

#[test]
fn reductions_agree_across_ranks() {
    let results = run_world(4, |comm| {
        let sum = comm.all_reduce_sum(comm.rank() as u64 + 1).unwrap();
        let any = comm.all_reduce_or(comm.rank() == 3).unwrap();
        let none = comm.all_reduce_or(false).unwrap();
        comm.barrier();
        (sum, any, none)
    });
    assert!(results.iter().all(|&r| r == (10, true, false)));
}

#[test]
fn variable_all_gather_with_empty_blocks() {
    let counts = [0usize, 3, 0, 2];
    let results = run_world(4, |comm| {
        let mine: Vec<u8> = (0..counts[comm.rank()]).map(|i| (comm.rank() * 10 + i) as u8).collect();
        comm.all_gather_bytes(&mine, &counts).unwrap()
    });
    for r in results {
        assert_eq!(r, vec![10, 11, 12, 30, 31]);
    }
}

#[test]
fn broadcast_from_every_root() {
    for root in 0..3 {
        let results = run_world(3, |comm| {
            let mut buf = if comm.rank() == root { [root as u8, 7, 7] } else { [0u8; 3] };
            comm.broadcast_bytes(root, &mut buf).unwrap();
            buf
        });
        assert!(results.iter().all(|b| *b == [root as u8, 7, 7]));
    }
}

// MPI can be initialized once per process, so every MPI check lives in this test.
#[cfg(feature = "mpi-support")]
#[test]
fn mpi_comm_smoke_if_available() {
    use dist_coloring::algs::communicator::MpiComm;
    let world = MpiComm::new().expect("MPI initialization failed");
    let (me, n) = (world.rank(), world.size());
    assert_eq!(world.all_reduce_sum(1).unwrap(), n as u64);
    assert!(world.all_reduce_or(me + 1 == n).unwrap());
    assert_eq!(
        world.reduce_words(me as u64).unwrap(),
        (0..n as u64).collect::<Vec<_>>()
    );

    // blocking point-to-point: one side sends first, the other receives first
    if n >= 2 && me < 2 {
        let peer = 1 - me;
        let mut buf = [0u8; 4];
        if me == 0 {
            world.isend(peer, 9, &[1, 2, 3, 4]);
            assert_eq!(world.irecv(peer, 9, &mut buf).wait().unwrap(), vec![5, 6, 7, 8]);
        } else {
            assert_eq!(world.irecv(peer, 9, &mut buf).wait().unwrap(), vec![1, 2, 3, 4]);
            world.isend(peer, 9, &[5, 6, 7, 8]);
        }
    }
    world.barrier();
}
