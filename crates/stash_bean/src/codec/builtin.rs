use std::borrow::Cow;
use std::path::PathBuf;

use crate::codec::{CodecError, CodecRegistry};
use crate::write::WriteContext;

macro_rules! register_with {
    ($registry:ident, $method:ident: $($ty:ty),+ $(,)?) => {
        $(
            $registry.register_fn(|ctx: &mut WriteContext<'_>, value: &$ty| {
                ctx.encoder().$method((*value).into())?;
                Ok(())
            });
        )+
    };
}

fn write_str(ctx: &mut WriteContext<'_>, value: &str) -> Result<(), CodecError> {
    ctx.encoder().write_string(value)?;
    Ok(())
}

pub(super) fn register_builtins(registry: &mut CodecRegistry) {
    // Registration order defines the tags.
    registry.register_fn(|_: &mut WriteContext<'_>, _: &()| Ok(()));
    register_with!(registry, write_bool: bool);
    registry.register_fn(|ctx: &mut WriteContext<'_>, value: &char| {
        ctx.encoder().write_u64(u64::from(u32::from(*value)))?;
        Ok(())
    });

    register_with!(registry, write_i64: i8, i16, i32, i64);
    registry.register_fn(|ctx: &mut WriteContext<'_>, value: &isize| {
        ctx.encoder().write_i64(*value as i64)?;
        Ok(())
    });
    register_with!(registry, write_i128: i128);

    register_with!(registry, write_u64: u8, u16, u32, u64);
    registry.register_fn(|ctx: &mut WriteContext<'_>, value: &usize| {
        ctx.encoder().write_u64(*value as u64)?;
        Ok(())
    });
    register_with!(registry, write_u128: u128);

    register_with!(registry, write_f32: f32);
    register_with!(registry, write_f64: f64);

    registry.register_fn(|ctx: &mut WriteContext<'_>, value: &String| write_str(ctx, value));
    registry.register_fn(|ctx: &mut WriteContext<'_>, value: &&'static str| write_str(ctx, value));
    registry.register_fn(|ctx: &mut WriteContext<'_>, value: &Cow<'static, str>| {
        write_str(ctx, value)
    });
    registry.register_fn(|ctx: &mut WriteContext<'_>, value: &PathBuf| {
        let path = value.to_str().ok_or_else(|| {
            CodecError::custom(format_args!("path `{}` is not valid UTF-8", value.display()))
        })?;
        write_str(ctx, path)
    });
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::Value;
    use crate::codec::CodecRegistry;
    use crate::output::BinaryEncoder;
    use crate::output::decode::Decoder;
    use crate::write::{BeanWriterCache, WriteContext};

    fn encode(value: &dyn Value) -> Vec<u8> {
        let codecs = CodecRegistry::new();
        let writers = BeanWriterCache::new(crate::bean::BeanRegistry::new());
        let mut encoder = BinaryEncoder::new(Vec::new());
        let entry = codecs.get(value.value_type_id()).unwrap();
        entry
            .encode(&mut WriteContext::new(&mut encoder, &codecs, &writers), value)
            .unwrap();
        encoder.into_inner()
    }

    #[test]
    fn integers_are_varints() {
        assert_eq!(encode(&-3_i8), [5]);
        assert_eq!(encode(&300_u16), [0xAC, 0x02]);
        assert_eq!(encode(&7_usize), [7]);
        assert_eq!(encode(&'a'), [97]);
        assert_eq!(encode(&true), [1]);
        assert_eq!(encode(&()), [] as [u8; 0]);
    }

    #[test]
    fn strings_share_one_layout() {
        let expected = [3, b'a', b'p', b'p'];
        assert_eq!(encode(&String::from("app")), expected);
        assert_eq!(encode(&"app"), expected);
        assert_eq!(encode(&std::borrow::Cow::Borrowed("app")), expected);

        let path = encode(&PathBuf::from("out/app.jar"));
        assert_eq!(Decoder::new(&path).read_string(), "out/app.jar");
    }

    #[test]
    fn floats_are_little_endian() {
        let bytes = encode(&1.5_f64);
        assert_eq!(Decoder::new(&bytes).read_f64(), 1.5);
        assert_eq!(encode(&1.0_f32), 1.0_f32.to_le_bytes());
    }
}
