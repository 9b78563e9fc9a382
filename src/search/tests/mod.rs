mod common;
mod test_prune_equivalence;
