use magnetic::error::EmuError;
use magnetic::host::KeyInput;
use magnetic::host_headless::HeadlessHost;
use magnetic::interpreter::Interpreter;
use magnetic::msrand::MsRand;
use magnetic::vm::{Game, VM};
use test_log::test;

/// Minimal `.mag` image: header, code, a zeroed string bank, no dictionary
fn image(version: u8, code: &[u8], undo_pc: u32) -> Vec<u8> {
    let strings = vec![0u8; 0x200];
    let mut out = b"MaSc".to_vec();
    out.extend_from_slice(&[0; 4]);
    out.extend_from_slice(&42u32.to_be_bytes());
    out.extend_from_slice(&[0, version]);
    for field in [code.len() as u32, strings.len() as u32, 0, 0, 0, 0x100, undo_pc] {
        out.extend_from_slice(&field.to_be_bytes());
    }
    out.extend_from_slice(code);
    out.extend_from_slice(&strings);
    out
}

fn interpreter(version: u8, code: &[u8], undo_pc: u32) -> Interpreter<HeadlessHost> {
    let game = Game::from_memory(image(version, code, undo_pc)).unwrap();
    Interpreter::new(VM::with_rng(game, MsRand::new_predictable(42)), HeadlessHost::new())
}

// print "hi", echo one key, then spin on BRA.S *
const ECHO_PROGRAM: [u8; 14] = [
    0x72, b'h', 0xa0, 0xf3, 0x72, b'i', 0xa0, 0xf3, 0xa0, 0x00, 0xa0, 0xf3, 0x60, 0xfe,
];

#[test]
fn test_program_runs_to_completion() {
    let mut interp = interpreter(2, &ECHO_PROGRAM, 0xffff);
    interp.host.type_text("x");
    interp.run().unwrap();
    assert_eq!(interp.host.get_output(), "hix");
    assert!(!interp.vm.is_running());
    assert_eq!(interp.vm.count(), 7);
}

#[test]
fn test_aborted_input_leaves_d1() {
    let mut interp = interpreter(2, &ECHO_PROGRAM, 0xffff);
    interp.host.push_key(KeyInput::Abort);
    interp.run().unwrap();
    // the key read left D1 holding 'i'
    assert_eq!(interp.host.get_output(), "hii");
}

#[test]
fn test_instruction_limit() {
    // BRA.W to itself
    let mut interp = interpreter(2, &[0x60, 0x00, 0xff, 0xfe], 0xffff);
    interp.run_with_limit(Some(100)).unwrap();
    assert_eq!(interp.vm.count(), 100);
    assert!(interp.vm.is_running());
}

#[test]
fn test_fatal_error_reaches_host() {
    // MULU D1,D0
    let mut interp = interpreter(1, &[0xc0, 0xc1], 0xffff);
    let err = interp.run().unwrap_err();
    assert!(matches!(err, EmuError::Unimplemented { opcode: 0xc0c1, .. }));
    let message = interp.host.fatal.clone().unwrap();
    assert!(message.contains("MULU"), "{message}");
    assert!(interp.vm.status().contains("PC=00002"));
}

#[test]
fn test_undo_through_the_host() {
    // turn boundary at 0: ADDQ.L #1,D0 ; read key ; BRA.S to 0
    let code = [0x52, 0x80, 0xa0, 0x00, 0x60, 0xfa];
    let mut interp = interpreter(2, &code, 0);
    interp.host.type_text("ab");
    interp.host.push_key(KeyInput::Undo);
    interp.run_with_limit(Some(8)).unwrap();
    // the third turn was taken back to the start of the second
    assert_eq!(interp.vm.regs.d(0), 1);
    assert_eq!(interp.vm.pc, 0);
    assert!(interp.host.get_output().contains("[Previous turn undone.]"));
}

#[test]
fn test_restart_from_game_code() {
    // ADDQ.L #1,D0 ; restart
    let mut interp = interpreter(2, &[0x52, 0x80, 0xa0, 0xee], 0xffff);
    interp.run_with_limit(Some(5)).unwrap();
    // restart resets D0, so it never climbs past 1
    assert_eq!(interp.vm.regs.d(0), 1);
    assert_eq!(interp.host.pictures.len(), 2);
}

#[test]
fn test_rejects_bad_images() {
    let mut bytes = image(2, &[0x4e, 0x71], 0);
    bytes[0] = b'm';
    assert!(matches!(Game::from_memory(bytes), Err(EmuError::BadImage(_))));

    let mut bytes = image(2, &[0x4e, 0x71], 0);
    bytes[13] = 9;
    assert!(matches!(Game::from_memory(bytes), Err(EmuError::BadImage(_))));

    let bytes = image(2, &[0x4e, 0x71], 0);
    assert!(Game::from_memory(bytes[..50].to_vec()).is_err());
}
