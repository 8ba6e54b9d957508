use chip8::{constants::*, prelude::*};

fn words(program: &[u16]) -> Vec<u8> {
    program.iter().flat_map(|w| w.to_be_bytes()).collect()
}

fn load(program: &[u16]) -> Chip8Vm {
    let mut vm = Chip8Vm::new(Chip8Conf {
        seed: Some(42),
        ..Default::default()
    });
    vm.load_rom(&words(program)).unwrap();
    vm
}

#[test]
fn test_draw_and_idle() {
    let mut vm = load(&[
        0x00E0, // CLS
        0x6105, // LD V1, 5
        0xA20A, // LD I, .sprite
        0xD011, // DRW V0, V1, 1
        0x1200, // JP 200
        0xF000, // .sprite
    ]);

    vm.run_steps(5).unwrap();
    assert_eq!(vm.cpu().pc(), 0x200);

    let display = vm.display();
    for x in 0..4 {
        assert!(display.pixel(x, 5), "pixel ({x}, 5)");
    }
    assert_eq!(display.lit_count(), 4);
    assert_eq!(vm.cpu().register(0xF), 0);

    // Idle loop runs forever without faulting.
    vm.run_steps(10_000).unwrap();
    assert_eq!(vm.display().lit_count(), 4);
    assert_eq!(vm.cpu().register(0xF), 0);
}

#[test]
fn test_zero_row_draw() {
    let mut vm = load(&[0x00E0, 0x6105, 0xA202, 0xD010, 0x1200]);
    assert_eq!(vm.run_steps(5).unwrap(), Flow::Jump);
    assert_eq!(vm.display().lit_count(), 0);
    assert_eq!(vm.cpu().register(0xF), 0);
    assert_eq!(vm.cpu().pc(), 0x200);
}

#[test]
fn test_font_glyph_render() {
    // Draw the glyph for digit 8 at the top left.
    let mut vm = load(&[0x6008, 0xF029, 0x6100, 0xD115, 0x1208]);
    vm.run_steps(4).unwrap();

    let text = vm.dump_display().unwrap();
    let rows: Vec<&str> = text.lines().take(5).map(|l| &l[..4]).collect();
    assert_eq!(rows, ["####", "#..#", "####", "#..#", "####"]);
}

#[test]
fn test_subroutine_counter() {
    // Call an increment routine until V0 reaches 10.
    let mut vm = load(&[
        0x220A, // 200: CALL 20A
        0x300A, // 202: SE V0, 10
        0x1200, // 204: JP 200
        0x1206, // 206: JP 206
        0x0000, // 208:
        0x7001, // 20A: ADD V0, 1
        0x00EE, // 20C: RET
    ]);

    vm.run_steps(200).unwrap();
    assert_eq!(vm.cpu().register(0), 10);
    assert_eq!(vm.cpu().pc(), 0x206);
    assert_eq!(vm.cpu().stack_depth(), 0);
}

#[test]
fn test_delay_loop() {
    // Spin until the delay timer reaches zero.
    let mut vm = load(&[
        0x6003, // LD V0, 3
        0xF015, // LD DT, V0
        0xF107, // LD V1, DT
        0x3100, // SE V1, 0
        0x1204, // JP 204
        0x620F, // LD V2, F
        0x120C, // JP 20C
    ]);

    let mut frames = 0;
    while vm.cpu().register(2) != 0xF {
        vm.run_frame().unwrap();
        frames += 1;
        assert!(frames < 10, "delay timer never expired");
    }
    assert_eq!(vm.cpu().delay_timer(), 0);
}

#[test]
fn test_key_wait_frames() {
    let mut vm = load(&[0xF30A, 0x6401, 0x1204]);

    // Frames keep ticking timers but the program does not advance.
    for _ in 0..3 {
        assert!(!vm.run_frame().unwrap());
        assert_eq!(vm.cpu().pc(), 0x200);
        assert!(vm.cpu().is_key_wait());
    }

    vm.set_key(KeyCode::KeyB, true);
    vm.run_frame().unwrap();
    assert_eq!(vm.cpu().register(3), 0xB);
    assert_eq!(vm.cpu().register(4), 1);
    assert!(!vm.cpu().is_key_wait());
    assert_eq!(vm.dump_keys().unwrap(), "keys: kb");

    vm.clear_keys();
    assert_eq!(vm.dump_keys().unwrap(), "");
}

#[test]
fn test_rom_too_large() {
    let mut vm = Chip8Vm::new(Chip8Conf::default());

    let rom = vec![0; MAX_PROGRAM_SIZE + 2];
    match vm.load_rom(&rom) {
        Err(Chip8Error::RomTooLarge { size, max }) => {
            assert_eq!(size, 4096 - 0x200 + 2);
            assert_eq!(max, 4096 - 0x200);
        }
        other => panic!("unexpected result: {other:?}"),
    }

    assert!(vm.load_rom(&vec![0; MAX_PROGRAM_SIZE]).is_ok());
}

#[test]
fn test_fault_is_reported_and_sticky() {
    // Falling off the end of the program into zeroed memory.
    let mut vm = load(&[0x6001]);
    vm.step().unwrap();

    let err = vm.step().unwrap_err();
    assert!(matches!(
        err,
        Chip8Error::UnknownOpcode {
            opcode: 0x0000,
            pc: 0x202
        }
    ));
    assert_eq!(err.pc(), Some(0x202));

    // The machine does not move past the fault.
    assert!(vm.step().is_err());
    assert_eq!(vm.cpu().pc(), 0x202);
}

#[test]
fn test_self_modifying_jump() {
    // Patch the low byte of a jump target before executing it.
    let mut vm = load(&[
        0xA207, // 200: LD I, 207
        0x600C, // 202: LD V0, 0C
        0xF055, // 204: LD [I], V0
        0x1200, // 206: JP 200 -> JP 20C after patch
        0x0000, // 208:
        0x0000, // 20A:
        0x6A77, // 20C: LD VA, 77
    ]);

    vm.run_steps(5).unwrap();
    assert_eq!(vm.cpu().register(0xA), 0x77);
}

#[test]
fn test_independent_instances() {
    let mut a = load(&[0x6001, 0x1202]);
    let b = load(&[0x6002, 0x1202]);

    a.run_steps(2).unwrap();
    assert_eq!(a.cpu().register(0), 1);
    assert_eq!(b.cpu().register(0), 0);
}
