use rand::Rng;

use super::layered::LayeredHashTree;
use super::proof::{Position, Proof, ProofStep};
use super::*;
use crate::bytes::{concat, parse_hex, reverse, to_hex};
use crate::hash::{HashFunction, Sha3_256, Sha256};
use crate::{hash_leaves, sample_leaves};

const MODES: [Mode; 2] = [Mode::Standard, Mode::Bitcoin];

fn abc() -> Vec<Hash> {
  hash_leaves(["a", "b", "c"], &Sha3_256)
}

#[test]
fn layer_shape() {
  for mode in MODES {
    for n in 0..=33 {
      let leaves = sample_leaves(n, &Sha256);
      let tree = LayeredHashTree::new(leaves.clone(), Sha256, mode);
      let layers = tree.layers();
      assert_eq!(leaves.as_slice(), layers[0].as_slice(), "{mode} n={n}");
      for k in 1..layers.len() {
        assert_eq!(layers[k - 1].len().div_ceil(2), layers[k].len(), "{mode} n={n} layer={k}");
      }
      let top = layers.last().unwrap();
      assert_eq!(if n == 0 { 0 } else { 1 }, top.len(), "{mode} n={n}");
      if n > 0 {
        assert_eq!(top[0].as_slice(), tree.root());
      }
      assert_eq!(n, tree.size());
    }
  }
}

#[test]
fn empty_tree() {
  for mode in MODES {
    let tree = LayeredHashTree::new(Vec::new(), Sha256, mode);
    assert_eq!(1, tree.layers().len());
    assert!(tree.layers()[0].is_empty());
    assert!(tree.root().is_empty());
    assert_eq!("0x", tree.root_hex());
    assert_eq!(0, tree.depth());
    assert_eq!(None, tree.leaf(0));
    assert!(tree.generate_proof(b"anything", None).is_empty());
    assert!(tree.generate_proof(b"anything", Some(0)).is_empty());
  }
}

#[test]
fn single_leaf_is_its_own_root() {
  for mode in MODES {
    let leaf = Sha256.hash(b"only");
    let tree = LayeredHashTree::new(vec![leaf.clone()], Sha256, mode);
    assert_eq!(vec![vec![leaf.clone()]], tree.layers().to_vec());
    assert_eq!(leaf.as_slice(), tree.root());

    let proof = tree.generate_proof(&leaf, None);
    assert!(proof.is_empty());
    assert!(!tree.verify(&proof, &leaf, tree.root()));
  }
}

#[test]
fn standard_mode_promotes_lonely_node_unchanged() {
  let leaves = abc();
  let (a, b, c) = (&leaves[0], &leaves[1], &leaves[2]);
  let tree = LayeredHashTree::new(leaves.clone(), Sha256, Mode::Standard);

  let ab = Sha256.hash(&concat(&[a, b]));
  assert_eq!(vec![ab.clone(), c.clone()], tree.layers()[1]);
  assert_eq!(Sha256.hash(&concat(&[&ab, c])).as_slice(), tree.root());
  assert_eq!(2, tree.depth());
}

#[test]
fn bitcoin_mode_pairs_lonely_node_with_itself() {
  let leaves = abc();
  let (a, b, c) = (&leaves[0], &leaves[1], &leaves[2]);
  let tree = LayeredHashTree::new(leaves.clone(), Sha256, Mode::Bitcoin);

  fn dhash(l: &[u8], r: &[u8]) -> Vec<u8> {
    reverse(&Sha256.hash(&Sha256.hash(&concat(&[reverse(l), reverse(r)]))))
  }
  let ab = dhash(a, b);
  let cc = dhash(c, c);
  assert_eq!(vec![ab.clone(), cc.clone()], tree.layers()[1]);
  assert_eq!(dhash(&ab, &cc).as_slice(), tree.root());

  let standard = LayeredHashTree::new(leaves, Sha256, Mode::Standard);
  assert_ne!(standard.root(), tree.root());
}

#[test]
fn sha3_leaves_sha256_nodes() {
  let leaves = abc();
  assert_eq!("0x80084bf2fba02475726feb2cab2d8215eab14bc6bdd8bfb2c8151257032ecd8b", to_hex(&leaves[0]));

  let tree = LayeredHashTree::new(leaves.clone(), Sha256, Mode::Standard);
  assert_eq!("0x49d2d1a14929a8f556bd6f4a698d90a48c9d1ca5a562773010dfdc93f8340ab9", tree.root_hex());

  let proof = tree.generate_proof(&leaves[1], Some(1));
  assert!(tree.verify(&proof, &leaves[1], tree.root()));
  assert!(!tree.verify(&proof, &leaves[0], tree.root()));

  let bitcoin = LayeredHashTree::new(leaves, Sha256, Mode::Bitcoin);
  assert_eq!("0x2ad29bb3b1644969e72dceca58c8d892818759365b5bfcfe1db0c8cf7ba9875e", bitcoin.root_hex());
}

#[test]
fn bitcoin_block_100000() {
  let txids = [
    "8c14f0db3df150123e6f3dbbf30f8b955a8249b62ac1d1ff16284aefa3d06d87",
    "fff2525b8931402dd09222c50775608f75787bd2b87e56995a7bdd30f79702c4",
    "6359f0868171b1d194cbee1af2f16ea598ae8fad666d9b012c8ed2b79a236ec4",
    "e9a66845e05d5abc0ad04ec80f774a7e585c6e8db975962d069a522137b80c1d",
  ];
  let leaves = txids.iter().map(|t| parse_hex(t).unwrap()).collect::<Vec<_>>();
  let tree = LayeredHashTree::new(leaves.clone(), Sha256, Mode::Bitcoin);
  assert_eq!("0xf3e94742aca4b5ef85488dc37c06c3282295ffec960994b2c0d5ac2a25a95766", tree.root_hex());

  for (i, leaf) in leaves.iter().enumerate() {
    let proof = tree.generate_proof(leaf, None);
    assert_eq!(2, proof.len());
    assert!(tree.verify(&proof, leaf, tree.root()), "tx {i}");
  }
}

#[test]
fn every_leaf_verifies() {
  for mode in MODES {
    for n in 2..=40 {
      let leaves = sample_leaves(n, &Sha256);
      let tree = LayeredHashTree::new(leaves.clone(), Sha256, mode);
      for (i, leaf) in leaves.iter().enumerate() {
        let proof = tree.generate_proof(leaf, Some(i));
        assert!(!proof.is_empty(), "{mode} n={n} i={i}");
        assert!(proof.len() <= tree.depth());
        assert!(tree.verify(&proof, leaf, tree.root()), "{mode} n={n} i={i}");
      }
    }
  }
}

#[test]
fn lonely_last_leaf_in_bitcoin_mode() {
  let leaves = abc();
  let tree = LayeredHashTree::new(leaves.clone(), Sha256, Mode::Bitcoin);
  let proof = tree.generate_proof(&leaves[2], None);
  let expected = vec![
    ProofStep::new(Position::Right, leaves[2].clone()),
    ProofStep::new(Position::Left, tree.layers()[1][0].clone()),
  ];
  assert_eq!(expected, proof.into_steps());

  // the same leaf is promoted without a sibling step in standard mode
  let tree = LayeredHashTree::new(leaves.clone(), Sha256, Mode::Standard);
  let proof = tree.generate_proof(&leaves[2], None);
  assert_eq!(vec![ProofStep::new(Position::Left, tree.layers()[1][0].clone())], proof.into_steps());
}

#[test]
fn lonely_inner_node_in_bitcoin_mode() {
  // leaf 4 of 6 is paired at layer 0 but its parent is unpaired at layer 1
  let leaves = sample_leaves(6, &Sha256);
  let tree = LayeredHashTree::new(leaves.clone(), Sha256, Mode::Bitcoin);
  let proof = tree.generate_proof(&leaves[4], Some(4));
  let steps = proof.steps();
  assert_eq!(3, steps.len());
  assert_eq!(ProofStep::new(Position::Right, leaves[5].clone()), steps[0]);
  assert_eq!(ProofStep::new(Position::Right, tree.layers()[1][2].clone()), steps[1]);
  assert!(tree.verify(&proof, &leaves[4], tree.root()));
}

#[test]
fn tampering_breaks_verification() {
  let mut rng = rand::rng();
  for mode in MODES {
    for n in [2, 3, 7, 16, 33] {
      let leaves = sample_leaves(n, &Sha256);
      let tree = LayeredHashTree::new(leaves.clone(), Sha256, mode);
      for (i, leaf) in leaves.iter().enumerate() {
        let proof = tree.generate_proof(leaf, Some(i));

        let mut target = leaf.clone();
        let at = rng.random_range(0..target.len());
        let bit = rng.random_range(0..8u32);
        target[at] ^= 1u8 << bit;
        assert!(!tree.verify(&proof, &target, tree.root()), "{mode} n={n} i={i}");

        let mut steps = proof.into_steps();
        let k = rng.random_range(0..steps.len());
        let at = rng.random_range(0..steps[k].data.len());
        steps[k].data[at] ^= 0xff;
        assert!(!tree.verify(&Proof::new(steps), leaf, tree.root()), "{mode} n={n} i={i} step={k}");
      }
    }
  }
}

#[test]
fn duplicate_leaves() {
  let leaves = hash_leaves(["a", "b", "a"], &Sha256);
  for mode in MODES {
    let tree = LayeredHashTree::new(leaves.clone(), Sha256, mode);
    let a = &leaves[0];
    assert_eq!(Some(0), tree.leaf_index(a));

    let first = tree.generate_proof(a, None);
    assert_eq!(tree.generate_proof(a, Some(0)), first);
    assert!(tree.verify(&first, a, tree.root()));

    let second = tree.generate_proof(a, Some(2));
    assert_ne!(first, second);
    assert!(tree.verify(&second, a, tree.root()));
  }
}

#[test]
fn unresolvable_leaf_yields_empty_proof() {
  let leaves = abc();
  let tree = LayeredHashTree::new(leaves.clone(), Sha256, Mode::Standard);
  let proof = tree.generate_proof(&Sha256.hash(b"z"), None);
  assert!(proof.is_empty());
  assert!(!tree.verify(&proof, &leaves[0], tree.root()));
  assert!(tree.generate_proof(&leaves[0], Some(3)).is_empty());
}

#[test]
fn empty_inputs_never_verify() {
  let leaves = abc();
  let tree = LayeredHashTree::new(leaves.clone(), Sha256, Mode::Standard);
  let proof = tree.generate_proof(&leaves[0], None);
  assert!(tree.verify(&proof, &leaves[0], tree.root()));
  assert!(!tree.verify(&proof, &[], tree.root()));
  assert!(!tree.verify(&proof, &leaves[0], &[]));
  assert!(!tree.verify(&Proof::default(), &leaves[0], tree.root()));
}

#[test]
fn verify_without_tree() {
  let leaves = abc();
  for mode in MODES {
    let tree = LayeredHashTree::new(leaves.clone(), Sha256, mode);
    let proof = tree.generate_proof(&leaves[0], None);
    assert!(proof::verify(&Sha256, mode, &proof, &leaves[0], tree.root()));
    assert!(!proof::verify(&Sha3_256, mode, &proof, &leaves[0], tree.root()));
  }
}

#[test]
fn proof_text() {
  let leaves = abc();
  let tree = LayeredHashTree::new(leaves.clone(), Sha256, Mode::Bitcoin);
  let proof = tree.generate_proof(&leaves[1], None);
  let text = proof.to_string();
  assert_eq!(2, text.lines().count());
  assert!(text.starts_with(&format!("left:{}\n", to_hex(&leaves[0]))));
  assert_eq!(proof, text.parse::<Proof>().unwrap());
  assert_eq!(64, proof.data_size());

  assert_eq!(Position::Right, "R:0x00".parse::<ProofStep>().unwrap().position);
  assert!(matches!("up:0x00".parse::<ProofStep>(), Err(crate::Error::InvalidProofStep(_))));
  assert!(matches!("0x00".parse::<ProofStep>(), Err(crate::Error::InvalidProofStep(_))));
  assert!(matches!("left:zz".parse::<ProofStep>(), Err(crate::Error::InvalidHex { .. })));
}

#[test]
fn tree_rendering() {
  let leaves = vec![vec![0x01u8], vec![0x02], vec![0x03]];
  let checksum = |data: &[u8]| vec![data.iter().fold(0u8, |a, b| a.wrapping_add(*b))];
  let tree = LayeredHashTree::new(leaves, checksum, Mode::Standard);
  assert_eq!("└─ 0x06\n  └─ 0x03\n  └─ 0x03\n    └─ 0x01\n    └─ 0x02\n    └─ 0x03\n", tree.to_string());
}

#[test]
fn concurrent_readers() {
  let leaves = sample_leaves(100, &Sha256);
  let tree = LayeredHashTree::new(leaves.clone(), Sha256, Mode::Bitcoin);
  std::thread::scope(|s| {
    for t in 0..4 {
      let tree = &tree;
      let leaves = &leaves;
      s.spawn(move || {
        for i in (t..leaves.len()).step_by(4) {
          let proof = tree.generate_proof(&leaves[i], Some(i));
          assert!(tree.verify(&proof, &leaves[i], tree.root()));
        }
      });
    }
  });
}
