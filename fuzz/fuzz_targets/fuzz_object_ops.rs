#![no_main]

use libfuzzer_sys::fuzz_target;
use shapejs::indexed::default_compare;
use shapejs::{
    Context, ContextConfig, JsObjectRef, JsValue, ObjectPropertyDescriptor, PresentAttributes,
    PropertyKey,
};

const KEY_POOL: &[&str] = &["a", "b", "c", "length", "0", "1", "7", "x", "y", "z"];

fn present(bits: u8) -> PresentAttributes {
    PresentAttributes::from_bits_truncate(bits)
}

fn pick_key(ctx: &mut Context, byte: u8) -> PropertyKey {
    ctx.key(KEY_POOL[byte as usize % KEY_POOL.len()])
}

fuzz_target!(|data: &[u8]| {
    // Limit input size to avoid timeout
    if data.len() > 4096 {
        return;
    }

    let threshold = data.first().map_or(8, |b| usize::from(b % 6));
    let mut ctx = Context::with_config(ContextConfig {
        structure_index_threshold: threshold,
        ..ContextConfig::default()
    });
    let objects: Vec<JsObjectRef> = (0..3).map(|_| ctx.create_object()).collect();
    let getter = ctx.create_native_function(
        "getter",
        |_ctx, this, _args| Ok(this),
        0,
    );

    for op in data.chunks_exact(4).skip(1) {
        let target = &objects[op[0] as usize % objects.len()];
        let key = pick_key(&mut ctx, op[1]);
        let bits = op[3];
        // Every operation must return Ok/Err or a bool, never panic
        let _ = match op[0] % 7 {
            0 => target.define_own_property(
                &mut ctx,
                &key,
                ObjectPropertyDescriptor::data(JsValue::from(u32::from(op[2])), present(bits)),
            ),
            1 => target.define_own_property(
                &mut ctx,
                &key,
                ObjectPropertyDescriptor::accessor(
                    (bits & 1 == 1).then(|| getter.clone()),
                    None,
                    present(bits >> 1),
                ),
            ),
            2 => target.define_own_property(
                &mut ctx,
                &key,
                ObjectPropertyDescriptor::generic(present(bits)),
            ),
            3 => Ok(target.delete_own_property(&key)),
            4 => target.put(&mut ctx, &key, JsValue::from(u32::from(op[2]))),
            5 => {
                let proto = objects[op[2] as usize % objects.len()].clone();
                Ok(target.set_prototype(&mut ctx, Some(proto)))
            }
            _ => target.sort(&mut ctx, default_compare).map(|()| true),
        };
        let _ = target.get(&mut ctx, &key);

        for obj in &objects {
            if let Err(err) = obj.borrow().check_invariants() {
                panic!("object invariant broken: {}", err);
            }
        }
    }
});
