#![allow(unused_macros)]
macro_rules! verbose_println {
    ($($p:expr),+) => {
        if crate::config::ARGS.verbose {
            println!($($p),+);
        }
    }
}
// Explicit carriage returns keep the output aligned when stdout is shared with a raw terminal.
macro_rules! info {
    ($($p:expr),+) => {
        println!(concat!(blue!("INFO"),": {}\r"),format_args!($($p),+))
    }
}

macro_rules! warn {
    ($($p:expr),+) => {
        println!(concat!(red!("WARNING"),": {}\r"),format_args!($($p),+))
    }
}
macro_rules! general_err {
    ($msg:expr) => {
        Error::new(crate::ErrorKind::General, None, format!("{}", $msg).as_str())
    };
}
macro_rules! test_err {
    ($ctx:expr,$($msg:expr),*) => {
        Error::new(crate::ErrorKind::Test, $ctx, format!($($msg),*).as_str())
    };
}
macro_rules! runtime_err {
    ($kind:expr,$ctx:expr,$($msg:expr),*) => {
        Error::new(
            $kind,
            $ctx,
            format!("{} {}", red!("Runtime Error"), format!($($msg),*)).as_str(),
        )
    };
}
macro_rules! color {
    ($color: literal, $msg: expr) => {
        concat!("\x1b[", $color, "m", $msg, "\x1b[0m")
    };
}
macro_rules! red {
    ($msg:expr) => {
        color!(91, $msg)
    };
}
macro_rules! green {
    ($msg:expr) => {
        color!(92, $msg)
    };
}
macro_rules! yellow {
    ($msg:expr) => {
        color!(93, $msg)
    };
}
macro_rules! blue {
    ($msg:expr) => {
        color!(94, $msg)
    };
}
