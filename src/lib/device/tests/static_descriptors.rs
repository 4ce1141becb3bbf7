//! Covers binding and teardown paths that never touch an HDT: static
//! descriptors only. `tests/hdt_binding.rs` covers the compatible-string
//! matching paths instead.

use core::sync::atomic::{AtomicI32, AtomicU32, Ordering};

use device::{
    ClassDriver, ClassHooks, ClassId, Dm, DmFlags, DmRemove, Driver, DriverHooks, DrvInfo,
    ErrorKind, NullSink, Registry,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn single_root_plus_child() -> Result<(), ErrorKind> {
    init_logging();
    static DRIVERS: &[Driver<()>] = &[
        Driver {
            name: "root_driver",
            uclass_id: ClassId::Root,
            of_match: &[],
            flags: DmFlags::empty(),
            priv_size: 0,
            plat_size: 0,
            per_child_size: 0,
            ops: DriverHooks::none(),
        },
        Driver {
            name: "uart",
            uclass_id: ClassId::Serial,
            of_match: &[],
            flags: DmFlags::empty(),
            priv_size: 0,
            plat_size: 0,
            per_child_size: 0,
            ops: DriverHooks::none(),
        },
    ];
    static UCLASSES: &[ClassDriver<()>] = &[
        ClassDriver {
            name: "root",
            id: ClassId::Root,
            per_device_size: 0,
            ops: ClassHooks::none(),
        },
        ClassDriver {
            name: "serial",
            id: ClassId::Serial,
            per_device_size: 0,
            ops: ClassHooks::none(),
        },
    ];
    static DESCRIPTORS: &[DrvInfo] = &[DrvInfo {
        driver_name: "uart",
        plat: None,
        parent_idx: None,
    }];
    static REGISTRY: Registry<()> = Registry::new(DRIVERS, UCLASSES, DESCRIPTORS);

    let mut dm: Dm<()> = Dm::new(&REGISTRY);
    let root = dm.init("root_driver")?;
    dm.scan_static_descriptors()?;

    assert_eq!(root.children().count(), 1);
    let uart = root.children().next().unwrap();
    assert_eq!(uart.name(), "uart");
    assert_eq!(uart.parent().unwrap().name(), "root_driver");

    let stats = dm.get_stats();
    assert_eq!(stats.device_count, 2);
    assert_eq!(stats.uclass_count, 2);

    dm.uninit()?;
    let stats_after = dm.get_stats();
    assert_eq!(stats_after.device_count, 0);
    assert_eq!(stats_after.uclass_count, 0);
    assert!(dm.root().is_none());

    // A second uninit on an already-torn-down tree is a harmless no-op.
    dm.uninit()?;
    Ok(())
}

#[test]
fn out_of_order_descriptors_resolve_across_passes() -> Result<(), ErrorKind> {
    static DRIVERS: &[Driver<()>] = &[
        Driver {
            name: "root_driver",
            uclass_id: ClassId::Root,
            of_match: &[],
            flags: DmFlags::empty(),
            priv_size: 0,
            plat_size: 0,
            per_child_size: 0,
            ops: DriverHooks::none(),
        },
        Driver {
            name: "bridge",
            uclass_id: ClassId::SimpleBus,
            of_match: &[],
            flags: DmFlags::empty(),
            priv_size: 0,
            plat_size: 0,
            per_child_size: 0,
            ops: DriverHooks::none(),
        },
        Driver {
            name: "leaf",
            uclass_id: ClassId::Gpio,
            of_match: &[],
            flags: DmFlags::empty(),
            priv_size: 0,
            plat_size: 0,
            per_child_size: 0,
            ops: DriverHooks::none(),
        },
    ];
    static UCLASSES: &[ClassDriver<()>] = &[
        ClassDriver {
            name: "root",
            id: ClassId::Root,
            per_device_size: 0,
            ops: ClassHooks::none(),
        },
        ClassDriver {
            name: "simple_bus",
            id: ClassId::SimpleBus,
            per_device_size: 0,
            ops: ClassHooks::none(),
        },
        ClassDriver {
            name: "gpio",
            id: ClassId::Gpio,
            per_device_size: 0,
            ops: ClassHooks::none(),
        },
    ];
    // Index 0 ("leaf") depends on index 1 ("bridge"), which is listed after
    // it. A single forward pass cannot resolve index 0 on its first visit;
    // the second pass must.
    static DESCRIPTORS: &[DrvInfo] = &[
        DrvInfo {
            driver_name: "leaf",
            plat: None,
            parent_idx: Some(1),
        },
        DrvInfo {
            driver_name: "bridge",
            plat: None,
            parent_idx: None,
        },
    ];
    static REGISTRY: Registry<()> = Registry::new(DRIVERS, UCLASSES, DESCRIPTORS);

    let mut dm: Dm<()> = Dm::new(&REGISTRY);
    let root = dm.init("root_driver")?;
    dm.scan_static_descriptors()?;

    assert_eq!(root.children().count(), 1);
    let bridge = root.children().next().unwrap();
    assert_eq!(bridge.name(), "bridge");
    assert_eq!(bridge.children().count(), 1);
    let leaf = bridge.children().next().unwrap();
    assert_eq!(leaf.name(), "leaf");

    let stats = dm.get_stats();
    assert_eq!(stats.device_count, 3);
    Ok(())
}

#[test]
fn parent_dependency_cycle_is_rejected() -> Result<(), ErrorKind> {
    init_logging();
    static DRIVERS: &[Driver<()>] = &[
        Driver {
            name: "root_driver",
            uclass_id: ClassId::Root,
            of_match: &[],
            flags: DmFlags::empty(),
            priv_size: 0,
            plat_size: 0,
            per_child_size: 0,
            ops: DriverHooks::none(),
        },
        Driver {
            name: "dep_a",
            uclass_id: ClassId::Test,
            of_match: &[],
            flags: DmFlags::empty(),
            priv_size: 0,
            plat_size: 0,
            per_child_size: 0,
            ops: DriverHooks::none(),
        },
        Driver {
            name: "dep_b",
            uclass_id: ClassId::Test,
            of_match: &[],
            flags: DmFlags::empty(),
            priv_size: 0,
            plat_size: 0,
            per_child_size: 0,
            ops: DriverHooks::none(),
        },
    ];
    static UCLASSES: &[ClassDriver<()>] = &[
        ClassDriver {
            name: "root",
            id: ClassId::Root,
            per_device_size: 0,
            ops: ClassHooks::none(),
        },
        ClassDriver {
            name: "test",
            id: ClassId::Test,
            per_device_size: 0,
            ops: ClassHooks::none(),
        },
    ];
    // Each descriptor names the other as its parent; neither ever resolves.
    static DESCRIPTORS: &[DrvInfo] = &[
        DrvInfo {
            driver_name: "dep_a",
            plat: None,
            parent_idx: Some(1),
        },
        DrvInfo {
            driver_name: "dep_b",
            plat: None,
            parent_idx: Some(0),
        },
    ];
    static REGISTRY: Registry<()> = Registry::new(DRIVERS, UCLASSES, DESCRIPTORS);

    let mut dm: Dm<()> = Dm::new(&REGISTRY);
    let _root = dm.init("root_driver")?;
    let result = dm.scan_static_descriptors();
    assert_eq!(result, Err(ErrorKind::Cycle));

    // Neither half of the cycle was bound; only the root exists.
    let stats = dm.get_stats();
    assert_eq!(stats.device_count, 1);
    Ok(())
}

#[test]
fn teardown_runs_remove_then_unbind_in_post_order() -> Result<(), ErrorKind> {
    static SEQ: AtomicU32 = AtomicU32::new(0);
    static ROOT_REMOVE: AtomicI32 = AtomicI32::new(-1);
    static MID_REMOVE: AtomicI32 = AtomicI32::new(-1);
    static LEAF_REMOVE: AtomicI32 = AtomicI32::new(-1);
    static ROOT_UNBIND: AtomicI32 = AtomicI32::new(-1);
    static MID_UNBIND: AtomicI32 = AtomicI32::new(-1);
    static LEAF_UNBIND: AtomicI32 = AtomicI32::new(-1);

    fn record(counter: &AtomicI32) {
        let seq = SEQ.fetch_add(1, Ordering::SeqCst) as i32;
        counter.store(seq, Ordering::SeqCst);
    }

    fn remove_root(_: &mut device::Device<()>, _: DmRemove) -> Result<(), ErrorKind> {
        record(&ROOT_REMOVE);
        Ok(())
    }
    fn remove_mid(_: &mut device::Device<()>, _: DmRemove) -> Result<(), ErrorKind> {
        record(&MID_REMOVE);
        Ok(())
    }
    fn remove_leaf(_: &mut device::Device<()>, _: DmRemove) -> Result<(), ErrorKind> {
        record(&LEAF_REMOVE);
        Ok(())
    }
    fn unbind_root(_: &mut device::Device<()>) -> Result<(), ErrorKind> {
        record(&ROOT_UNBIND);
        Ok(())
    }
    fn unbind_mid(_: &mut device::Device<()>) -> Result<(), ErrorKind> {
        record(&MID_UNBIND);
        Ok(())
    }
    fn unbind_leaf(_: &mut device::Device<()>) -> Result<(), ErrorKind> {
        record(&LEAF_UNBIND);
        Ok(())
    }

    static DRIVERS: &[Driver<()>] = &[
        Driver {
            name: "root_driver",
            uclass_id: ClassId::Root,
            of_match: &[],
            flags: DmFlags::PROBE_AFTER_BIND,
            priv_size: 0,
            plat_size: 0,
            per_child_size: 0,
            ops: DriverHooks {
                remove: Some(remove_root),
                unbind: Some(unbind_root),
                ..DriverHooks::none()
            },
        },
        Driver {
            name: "mid",
            uclass_id: ClassId::SimpleBus,
            of_match: &[],
            flags: DmFlags::PROBE_AFTER_BIND,
            priv_size: 0,
            plat_size: 0,
            per_child_size: 0,
            ops: DriverHooks {
                remove: Some(remove_mid),
                unbind: Some(unbind_mid),
                ..DriverHooks::none()
            },
        },
        Driver {
            name: "leaf",
            uclass_id: ClassId::Gpio,
            of_match: &[],
            flags: DmFlags::PROBE_AFTER_BIND,
            priv_size: 0,
            plat_size: 0,
            per_child_size: 0,
            ops: DriverHooks {
                remove: Some(remove_leaf),
                unbind: Some(unbind_leaf),
                ..DriverHooks::none()
            },
        },
    ];
    static UCLASSES: &[ClassDriver<()>] = &[
        ClassDriver {
            name: "root",
            id: ClassId::Root,
            per_device_size: 0,
            ops: ClassHooks::none(),
        },
        ClassDriver {
            name: "simple_bus",
            id: ClassId::SimpleBus,
            per_device_size: 0,
            ops: ClassHooks::none(),
        },
        ClassDriver {
            name: "gpio",
            id: ClassId::Gpio,
            per_device_size: 0,
            ops: ClassHooks::none(),
        },
    ];
    static DESCRIPTORS: &[DrvInfo] = &[
        DrvInfo {
            driver_name: "mid",
            plat: None,
            parent_idx: None,
        },
        DrvInfo {
            driver_name: "leaf",
            plat: None,
            parent_idx: Some(0),
        },
    ];
    static REGISTRY: Registry<()> = Registry::new(DRIVERS, UCLASSES, DESCRIPTORS);

    let mut dm: Dm<()> = Dm::new(&REGISTRY);
    dm.init("root_driver")?;
    dm.scan_static_descriptors()?;
    dm.probe_tree(false)?;
    dm.uninit()?;

    let (root_r, mid_r, leaf_r) = (
        ROOT_REMOVE.load(Ordering::SeqCst),
        MID_REMOVE.load(Ordering::SeqCst),
        LEAF_REMOVE.load(Ordering::SeqCst),
    );
    let (root_u, mid_u, leaf_u) = (
        ROOT_UNBIND.load(Ordering::SeqCst),
        MID_UNBIND.load(Ordering::SeqCst),
        LEAF_UNBIND.load(Ordering::SeqCst),
    );

    assert!(leaf_r < mid_r && mid_r < root_r, "remove must run leaves-first");
    assert!(leaf_u < mid_u && mid_u < root_u, "unbind must run leaves-first");
    assert!(root_r < leaf_u, "every remove must finish before any unbind starts");
    Ok(())
}

/// A board that wants a single global `Dm` reachable from a `static` wraps
/// it in its own `spin::Mutex`, relying on `Dm<N>: Send`.
#[test]
fn dm_can_be_stashed_in_a_static_mutex() -> Result<(), ErrorKind> {
    static DRIVERS: &[Driver<()>] = &[];
    static UCLASSES: &[ClassDriver<()>] = &[];
    static DESCRIPTORS: &[DrvInfo] = &[];
    static REGISTRY: Registry<()> = Registry::new(DRIVERS, UCLASSES, DESCRIPTORS);
    static DM: spin::Mutex<Dm<()>> = spin::Mutex::new(Dm::new(&REGISTRY));

    let mut guard = DM.lock();
    let result = guard.init("root_driver");
    assert_eq!(result.unwrap_err(), ErrorKind::NotFound);
    Ok(())
}

#[test]
fn event_sink_default_is_a_silent_no_op() -> Result<(), ErrorKind> {
    use device::{EventSink, EventTag};
    let sink = NullSink;
    sink.notify(EventTag::PreRelocation)?;
    sink.notify(EventTag::PostRelocation)?;
    Ok(())
}

#[test]
fn unregistered_descriptor_driver_is_a_warning_not_an_abort() -> Result<(), ErrorKind> {
    init_logging();
    static DRIVERS: &[Driver<()>] = &[
        Driver {
            name: "root_driver",
            uclass_id: ClassId::Root,
            of_match: &[],
            flags: DmFlags::empty(),
            priv_size: 0,
            plat_size: 0,
            per_child_size: 0,
            ops: DriverHooks::none(),
        },
        Driver {
            name: "uart",
            uclass_id: ClassId::Serial,
            of_match: &[],
            flags: DmFlags::empty(),
            priv_size: 0,
            plat_size: 0,
            per_child_size: 0,
            ops: DriverHooks::none(),
        },
    ];
    static UCLASSES: &[ClassDriver<()>] = &[
        ClassDriver {
            name: "root",
            id: ClassId::Root,
            per_device_size: 0,
            ops: ClassHooks::none(),
        },
        ClassDriver {
            name: "serial",
            id: ClassId::Serial,
            per_device_size: 0,
            ops: ClassHooks::none(),
        },
    ];
    // "missing" names no registered driver; "uart" does. The pass must still
    // bind "uart" and report `NoDriver` (not abort on the first descriptor).
    static DESCRIPTORS: &[DrvInfo] = &[
        DrvInfo {
            driver_name: "missing",
            plat: None,
            parent_idx: None,
        },
        DrvInfo {
            driver_name: "uart",
            plat: None,
            parent_idx: None,
        },
    ];
    static REGISTRY: Registry<()> = Registry::new(DRIVERS, UCLASSES, DESCRIPTORS);

    let mut dm: Dm<()> = Dm::new(&REGISTRY);
    let root = dm.init("root_driver")?;
    let result = dm.scan_static_descriptors();
    assert_eq!(result, Err(ErrorKind::NoDriver));

    assert_eq!(root.children().count(), 1);
    assert_eq!(root.children().next().unwrap().name(), "uart");
    Ok(())
}

#[test]
fn child_post_bind_failure_rolls_back_the_child() -> Result<(), ErrorKind> {
    init_logging();
    fn reject_child(_: &mut device::Device<()>) -> Result<(), ErrorKind> {
        Err(ErrorKind::DriverError)
    }

    static DRIVERS: &[Driver<()>] = &[
        Driver {
            name: "root_driver",
            uclass_id: ClassId::Root,
            of_match: &[],
            flags: DmFlags::empty(),
            priv_size: 0,
            plat_size: 0,
            per_child_size: 0,
            ops: DriverHooks {
                child_post_bind: Some(reject_child),
                ..DriverHooks::none()
            },
        },
        Driver {
            name: "leaf",
            uclass_id: ClassId::Gpio,
            of_match: &[],
            flags: DmFlags::empty(),
            priv_size: 0,
            plat_size: 0,
            per_child_size: 0,
            ops: DriverHooks::none(),
        },
    ];
    static UCLASSES: &[ClassDriver<()>] = &[
        ClassDriver {
            name: "root",
            id: ClassId::Root,
            per_device_size: 0,
            ops: ClassHooks::none(),
        },
        ClassDriver {
            name: "gpio",
            id: ClassId::Gpio,
            per_device_size: 0,
            ops: ClassHooks::none(),
        },
    ];
    static DESCRIPTORS: &[DrvInfo] = &[DrvInfo {
        driver_name: "leaf",
        plat: None,
        parent_idx: None,
    }];
    static REGISTRY: Registry<()> = Registry::new(DRIVERS, UCLASSES, DESCRIPTORS);

    let mut dm: Dm<()> = Dm::new(&REGISTRY);
    let root = dm.init("root_driver")?;
    let result = dm.scan_static_descriptors();
    assert_eq!(result, Err(ErrorKind::DriverError));

    // The child must be unwound, not left half-linked: no child on root, and
    // the uclass count stays at 1 (root's own uclass only).
    assert_eq!(root.children().count(), 0);
    assert_eq!(dm.get_stats().uclass_count, 1);
    Ok(())
}

#[test]
fn child_pre_probe_runs_before_the_childs_own_probe_hook() -> Result<(), ErrorKind> {
    init_logging();
    static SEQ: AtomicU32 = AtomicU32::new(0);
    static PARENT_PRE_PROBE: AtomicI32 = AtomicI32::new(-1);
    static CHILD_PROBE: AtomicI32 = AtomicI32::new(-1);

    fn record(counter: &AtomicI32) {
        let seq = SEQ.fetch_add(1, Ordering::SeqCst) as i32;
        counter.store(seq, Ordering::SeqCst);
    }

    fn parent_pre_probe(_: &mut device::Device<()>) -> Result<(), ErrorKind> {
        record(&PARENT_PRE_PROBE);
        Ok(())
    }
    fn child_probe(_: &mut device::Device<()>) -> Result<(), ErrorKind> {
        record(&CHILD_PROBE);
        Ok(())
    }

    static DRIVERS: &[Driver<()>] = &[
        Driver {
            name: "root_driver",
            uclass_id: ClassId::Root,
            of_match: &[],
            flags: DmFlags::PROBE_AFTER_BIND,
            priv_size: 0,
            plat_size: 0,
            per_child_size: 0,
            ops: DriverHooks {
                child_pre_probe: Some(parent_pre_probe),
                ..DriverHooks::none()
            },
        },
        Driver {
            name: "leaf",
            uclass_id: ClassId::Gpio,
            of_match: &[],
            flags: DmFlags::PROBE_AFTER_BIND,
            priv_size: 0,
            plat_size: 0,
            per_child_size: 0,
            ops: DriverHooks {
                probe: Some(child_probe),
                ..DriverHooks::none()
            },
        },
    ];
    static UCLASSES: &[ClassDriver<()>] = &[
        ClassDriver {
            name: "root",
            id: ClassId::Root,
            per_device_size: 0,
            ops: ClassHooks::none(),
        },
        ClassDriver {
            name: "gpio",
            id: ClassId::Gpio,
            per_device_size: 0,
            ops: ClassHooks::none(),
        },
    ];
    static DESCRIPTORS: &[DrvInfo] = &[DrvInfo {
        driver_name: "leaf",
        plat: None,
        parent_idx: None,
    }];
    static REGISTRY: Registry<()> = Registry::new(DRIVERS, UCLASSES, DESCRIPTORS);

    let mut dm: Dm<()> = Dm::new(&REGISTRY);
    dm.init("root_driver")?;
    dm.scan_static_descriptors()?;
    dm.probe_tree(false)?;

    let pre_probe = PARENT_PRE_PROBE.load(Ordering::SeqCst);
    let probe = CHILD_PROBE.load(Ordering::SeqCst);
    assert!(pre_probe >= 0 && probe >= 0);
    assert!(pre_probe < probe, "child_pre_probe must run before the child's own probe hook");
    Ok(())
}
