/// Unwraps the `Err` of a result, panicking with the `Ok` value otherwise.
#[macro_export]
macro_rules! assert_err {
    ($e:expr $(, $($t:tt)* )?) => {
        match $e {
            Err(e) => e,
            Ok(actual) => {
                use std::fmt::Write;
                let mut msg = format!("expected `Err`; actual=Ok({:?})", actual);

                $(
                    write!(msg, ", ").unwrap();
                    write!(msg, $($t)*).unwrap();
                )?

                panic!("{}", msg);
            }
        }
    };
}

/// Unwraps the `Err` of a result and checks it with the named predicate
/// method, e.g. `assert_err_is!(res, is_connection)`.
#[macro_export]
macro_rules! assert_err_is {
    ($e:expr, $predicate:ident) => {{
        let err = $crate::assert_err!($e);
        assert!(
            err.$predicate(),
            "expected error to satisfy `{}`; actual={}",
            stringify!($predicate),
            err
        );
        err
    }};
}

#[macro_export]
macro_rules! assert_ok {
    ($e:expr) => {
        match $e {
            Ok(v) => v,
            Err(err) => panic!("expected `Ok`; actual=Err({})", err),
        }
    };
}
