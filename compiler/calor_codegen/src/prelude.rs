//! The `Calor.Runtime` support namespace.
//!
//! Emitted ahead of user code unless disabled: the contract-violation
//! signal, the exception wrapper for thrown values, and the option/result
//! types the `some`/`none`/`ok`/`err` constructors lower to. `None`/`Ok`/
//! `Err` use the implicit-conversion-from-marker pattern so C# type
//! inference works without explicit type arguments at the call site.

/// C# source of the runtime support namespace.
pub const RUNTIME_PRELUDE: &str = r#"namespace Calor.Runtime
{
    public class ContractViolationException : System.Exception
    {
        public string Clause { get; }
        public string Condition { get; }

        public ContractViolationException(string clause, string condition)
            : base("contract violation: " + clause + " " + condition)
        {
            Clause = clause;
            Condition = condition;
        }

        public ContractViolationException(string clause, string condition, string detail)
            : base("contract violation: " + clause + " " + condition + ": " + detail)
        {
            Clause = clause;
            Condition = condition;
        }
    }

    public class CalorException : System.Exception
    {
        public string Payload { get; }

        public CalorException(string payload) : base(payload)
        {
            Payload = payload;
        }
    }

    public readonly struct Unit
    {
        public static readonly Unit Value = default;
    }

    public readonly struct NoneOption
    {
    }

    public readonly struct Option<T>
    {
        public bool IsSome { get; }
        public T Value { get; }
        public bool IsNone => !IsSome;

        private Option(bool isSome, T value)
        {
            IsSome = isSome;
            Value = value;
        }

        public static Option<T> Some(T value) => new Option<T>(true, value);

        public static implicit operator Option<T>(NoneOption none) => default;

        public T Unwrap()
        {
            if (!IsSome)
            {
                throw new CalorException("unwrap of none");
            }
            return Value;
        }

        public T UnwrapOr(T fallback) => IsSome ? Value : fallback;
    }

    public static class Option
    {
        public static Option<T> Some<T>(T value) => Option<T>.Some(value);
        public static NoneOption None => default;
    }

    public readonly struct OkResult<T>
    {
        public readonly T Value;
        public OkResult(T value) { Value = value; }
    }

    public readonly struct ErrResult<E>
    {
        public readonly E Error;
        public ErrResult(E error) { Error = error; }
    }

    public readonly struct Result<T, E>
    {
        public bool IsOk { get; }
        public T Value { get; }
        public E Error { get; }
        public bool IsErr => !IsOk;

        private Result(bool isOk, T value, E error)
        {
            IsOk = isOk;
            Value = value;
            Error = error;
        }

        public static implicit operator Result<T, E>(OkResult<T> ok) =>
            new Result<T, E>(true, ok.Value, default);

        public static implicit operator Result<T, E>(ErrResult<E> err) =>
            new Result<T, E>(false, default, err.Error);

        public T Unwrap()
        {
            if (!IsOk)
            {
                throw new CalorException("unwrap of err");
            }
            return Value;
        }
    }

    public static class Result
    {
        public static OkResult<T> Ok<T>(T value) => new OkResult<T>(value);
        public static ErrResult<E> Err<E>(E error) => new ErrResult<E>(error);
    }
}
"#;
