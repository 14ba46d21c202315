// tests/integration_tests.rs
use tomasulo_rust::engine::simulator::{InstrRecord, Simulator};
use tomasulo_rust::utils::parser::parse_program;
use tomasulo_rust::TomasuloConfig;

/// End-to-end scenarios for the Tomasulo engine

/// Helper: parse a program and run it to completion
fn run_program(source: &str, config: TomasuloConfig) -> Simulator {
    let (program, errors) = parse_program(source);
    assert!(errors.is_empty(), "unexpected parse errors: {:?}", errors);
    let mut simulator = Simulator::new(program, config);
    simulator.run().expect("simulation failed");
    assert!(simulator.is_finished(), "simulation did not terminate");
    simulator
}

fn run_default(source: &str) -> Simulator {
    run_program(source, TomasuloConfig::new())
}

/// Records that retired (reached commit without being squashed)
fn retired(simulator: &Simulator) -> Vec<&InstrRecord> {
    simulator
        .records()
        .iter()
        .filter(|r| r.stage.commit.is_some() && !r.squashed)
        .collect()
}

/// Universal pipeline invariants, checked after every scenario:
/// in-order retirement, stage monotonicity, latency-exact execution, and
/// one writeback per cycle (the configurations here all use a 1-wide CDB
/// and single commit).
fn assert_pipeline_invariants(simulator: &Simulator) {
    let mut last_commit = 0;
    for record in retired(simulator) {
        let issue = record.stage.issue.expect("retired without issue stamp");
        let exec_start = record.stage.exec_start.expect("retired without exec_start");
        let exec_end = record.stage.exec_end.expect("retired without exec_end");
        let writeback = record.stage.writeback.expect("retired without writeback");
        let commit = record.stage.commit.expect("retired without commit");

        assert!(issue <= exec_start, "#{}: issue after exec_start", record.id);
        assert!(exec_start <= exec_end, "#{}: exec_start after exec_end", record.id);
        assert!(exec_end <= writeback, "#{}: exec_end after writeback", record.id);
        assert!(writeback <= commit, "#{}: writeback after commit", record.id);
        assert_eq!(
            exec_end - exec_start + 1,
            record.instr.latency(),
            "#{}: execution span does not match the latency table",
            record.id
        );

        // Retirement is in order and at most one instruction per cycle
        assert!(commit > last_commit, "#{}: out-of-order or multi-commit", record.id);
        last_commit = commit;
    }

    let mut writebacks: Vec<usize> = simulator
        .records()
        .iter()
        .filter_map(|r| r.stage.writeback)
        .collect();
    let total = writebacks.len();
    writebacks.sort_unstable();
    writebacks.dedup();
    assert_eq!(writebacks.len(), total, "two instructions shared a writeback cycle");
}

#[test]
fn test_dependent_add_chain() {
    // Scenario 1
    let simulator = run_default(
        "ADDI R1, R0, 5\n\
         ADDI R2, R0, 7\n\
         ADD R3, R1, R2\n",
    );
    assert_eq!(simulator.registers().read(3), 12);
    assert!(
        simulator.cycle_count() <= 7,
        "took {} cycles, expected at most 7",
        simulator.cycle_count()
    );
    assert_pipeline_invariants(&simulator);
}

#[test]
fn test_mul_latency_and_raw_forwarding() {
    // Scenario 2
    let simulator = run_default(
        "ADDI R1, R0, 4\n\
         MUL R2, R1, R1\n\
         ADD R3, R2, R1\n",
    );
    assert_eq!(simulator.registers().read(2), 16);
    assert_eq!(simulator.registers().read(3), 20);

    let records = simulator.records();
    let mul = &records[1];
    let add = &records[2];
    let mul_writeback = mul.stage.writeback.unwrap();
    // The dependent ADD starts the cycle after the MUL's broadcast
    assert_eq!(add.stage.exec_start.unwrap(), mul_writeback + 1);
    // MUL: 3 execute cycles plus issue->exec and exec->writeback boundaries
    assert!(mul_writeback >= mul.stage.issue.unwrap() + 3 + 2);
    assert_pipeline_invariants(&simulator);
}

#[test]
fn test_div_by_zero_traps_at_commit() {
    // Scenario 3
    let simulator = run_default(
        "ADDI R1, R0, 8\n\
         DIV R2, R1, R0\n",
    );
    let trap = simulator.trap().expect("expected a trap");
    assert_eq!(trap.instr_id, 1);
    // The trap surfaces at the DIV's commit stamp
    assert!(simulator.records()[1].stage.commit.is_some());
    // Retired state is intact, the trapped destination is untouched
    assert_eq!(simulator.registers().read(1), 8);
    assert_eq!(simulator.registers().read(2), 0);
}

#[test]
fn test_mispredicted_branch_squashes_wrong_path() {
    // Scenario 4: under not-taken prediction the +99 instruction is issued
    // speculatively, then squashed when the taken BEQ commits.
    let simulator = run_default(
        "ADDI R1, R0, 0\n\
         ADDI R2, R0, 10\n\
         BEQ R1, R0, 2\n\
         ADDI R2, R0, 99\n\
         ADDI R2, R0, 7\n",
    );
    assert_eq!(simulator.registers().read(2), 7);

    let records = simulator.records();
    let branch = &records[2];
    assert_eq!(branch.predicted_taken, Some(false));
    assert_eq!(branch.actual_taken, Some(true));
    assert_eq!(simulator.stats().branch_mispredictions, 1);

    // The wrong-path +99 was issued speculatively and squashed
    let wrong_path: Vec<&InstrRecord> =
        records.iter().filter(|r| r.pc == 3).collect();
    assert!(!wrong_path.is_empty());
    for record in wrong_path {
        assert!(record.speculative);
        assert!(record.squashed);
        assert!(record.stage.commit.is_none());
    }

    // Nothing squashed is present in the retired stream, and fetch resumed
    // at the branch target
    assert!(retired(&simulator).iter().all(|r| !r.squashed));
    let refetched = records
        .iter()
        .rfind(|r| r.pc == 4 && !r.squashed)
        .expect("correct-path target was never refetched");
    assert!(refetched.stage.commit.is_some());
    assert_pipeline_invariants(&simulator);
}

#[test]
fn test_store_to_load_ordering() {
    // Scenario 5: the load must wait for the older same-address store to
    // commit before executing.
    let simulator = run_default(
        "ADDI R1, R0, 5\n\
         SW R1, 0(R0)\n\
         LW R2, 0(R0)\n\
         ADD R3, R2, R1\n",
    );
    assert_eq!(simulator.registers().read(2), 5);
    assert_eq!(simulator.registers().read(3), 10);
    assert_eq!(simulator.memory().read_word(0), Some(5));

    let records = simulator.records();
    let store_commit = records[1].stage.commit.unwrap();
    let load_exec_start = records[2].stage.exec_start.unwrap();
    assert!(load_exec_start >= store_commit);
    assert_pipeline_invariants(&simulator);
}

#[test]
fn test_cdb_serializes_independent_writebacks() {
    // Scenario 6: two independent ALU ops on a 2-entry pool with a 1-wide
    // CDB: exactly one writeback per cycle.
    let simulator = run_program(
        "ADDI R1, R0, 1\n\
         ADDI R2, R0, 2\n",
        TomasuloConfig::new().with_alu_stations(2),
    );
    let records = simulator.records();
    let first_writeback = records[0].stage.writeback.unwrap();
    let second_writeback = records[1].stage.writeback.unwrap();
    assert_eq!(second_writeback, first_writeback + 1);
    assert_pipeline_invariants(&simulator);
}

#[test]
fn test_waw_renaming_allows_overlap() {
    // A slow DIV and a later ADDI both write R1. Renaming lets the ADDI
    // execute long before the DIV's broadcast; in-order commit still leaves
    // the younger value architectural.
    let simulator = run_default(
        "ADDI R2, R0, 64\n\
         ADDI R3, R0, 4\n\
         DIV R1, R2, R3\n\
         ADDI R1, R0, 5\n",
    );
    assert_eq!(simulator.registers().read(1), 5);

    let records = simulator.records();
    let div_writeback = records[2].stage.writeback.unwrap();
    let addi_exec_start = records[3].stage.exec_start.unwrap();
    assert!(
        addi_exec_start < div_writeback,
        "WAW dependence stalled the younger write"
    );
    assert_pipeline_invariants(&simulator);
}

#[test]
fn test_war_renaming_allows_overlap() {
    // DIV reads R3; the younger ADDI overwrites R3. The read captured its
    // operand at issue, so the overwrite proceeds in parallel.
    let simulator = run_default(
        "ADDI R2, R0, 64\n\
         ADDI R3, R0, 4\n\
         DIV R5, R2, R3\n\
         ADDI R3, R0, 9\n",
    );
    assert_eq!(simulator.registers().read(5), 16);
    assert_eq!(simulator.registers().read(3), 9);

    let records = simulator.records();
    let div_writeback = records[2].stage.writeback.unwrap();
    let addi_exec_start = records[3].stage.exec_start.unwrap();
    assert!(
        addi_exec_start < div_writeback,
        "WAR dependence stalled the younger write"
    );
    assert_pipeline_invariants(&simulator);
}

#[test]
fn test_jump_redirects_fetch() {
    // J skips the middle instruction without any misprediction
    let simulator = run_default(
        "ADDI R1, R0, 1\n\
         J 3\n\
         ADDI R1, R0, 99\n\
         ADDI R2, R0, 2\n",
    );
    assert_eq!(simulator.registers().read(1), 1);
    assert_eq!(simulator.registers().read(2), 2);
    assert_eq!(simulator.stats().branch_mispredictions, 0);
    // The skipped instruction was never fetched
    assert!(simulator.records().iter().all(|r| r.pc != 2));
    assert_pipeline_invariants(&simulator);
}

#[test]
fn test_jal_links_return_address() {
    let simulator = run_default(
        "JAL 2\n\
         NOP\n\
         ADDI R1, R0, 3\n",
    );
    // JAL at index 0 links index 1 into R31
    assert_eq!(simulator.registers().read(31), 1);
    assert_eq!(simulator.registers().read(1), 3);
    assert!(simulator.records().iter().all(|r| r.pc != 1));
    assert_pipeline_invariants(&simulator);
}

#[test]
fn test_backward_branch_loop() {
    // Counting loop: R1 counts 3 down to 0, R2 accumulates. The 1-bit
    // predictor learns the taken backward branch after one trip.
    let simulator = run_program(
        "ADDI R1, R0, 3\n\
         ADDI R2, R2, 10\n\
         ADDI R1, R1, -1\n\
         BGT R1, R0, -2\n",
        TomasuloConfig::new()
            .with_predictor(tomasulo_rust::engine::branch_predictor::BranchPredictorKind::OneBit),
    );
    assert_eq!(simulator.registers().read(1), 0);
    assert_eq!(simulator.registers().read(2), 30);
    assert_pipeline_invariants(&simulator);
}

#[test]
fn test_termination_on_plain_programs() {
    for source in [
        "NOP\n",
        "ADDI R1, R0, 1\n",
        "NOP\nNOP\nNOP\n",
        "ADD R1, R0, R0\nSUB R2, R1, R1\nMUL R3, R2, R2\n",
    ] {
        let simulator = run_default(source);
        assert!(simulator.is_finished());
        assert_eq!(
            retired(&simulator).len(),
            simulator.records().len(),
            "straight-line program retired fewer instructions than it fetched"
        );
    }
}
