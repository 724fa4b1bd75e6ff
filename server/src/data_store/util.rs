use std::fmt::{Display, Formatter};

pub struct EnumMemberNotExistingError {
    pub member_value: i32,
    pub enum_name: &'static str,
}

impl Display for EnumMemberNotExistingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} is not a valid value for {} enum",
            self.member_value, self.enum_name
        )
    }
}

/// Implement storing a fieldless enum as integer column in the database.
///
/// The enum must derive `AsExpression` and `FromSqlRow` with
/// `#[diesel(sql_type = diesel::sql_types::Integer)]` and be `Copy`. The macro creates the
/// conversions from and to `i32` (with the given discriminant values) and the `ToSql`/`FromSql`
/// implementations based on them.
macro_rules! sql_integer_enum {
    ($enum_name:ident { $($member:ident = $value:literal),+ $(,)? }) => {
        impl TryFrom<i32> for $enum_name {
            type Error = $crate::data_store::util::EnumMemberNotExistingError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                match value {
                    $($value => Ok($enum_name::$member),)+
                    _ => Err($crate::data_store::util::EnumMemberNotExistingError {
                        member_value: value,
                        enum_name: stringify!($enum_name),
                    }),
                }
            }
        }

        impl From<$enum_name> for i32 {
            fn from(value: $enum_name) -> Self {
                match value {
                    $($enum_name::$member => $value,)+
                }
            }
        }

        impl<DB> diesel::serialize::ToSql<diesel::sql_types::Integer, DB> for $enum_name
        where
            DB: diesel::backend::Backend,
            for<'c> DB: diesel::backend::Backend<
                BindCollector<'c> = diesel::query_builder::bind_collector::RawBytesBindCollector<DB>,
            >,
            i32: diesel::serialize::ToSql<diesel::sql_types::Integer, DB>,
        {
            fn to_sql<'b>(
                &'b self,
                out: &mut diesel::serialize::Output<'b, '_, DB>,
            ) -> diesel::serialize::Result {
                let value: i32 = (*self).into();
                <i32 as diesel::serialize::ToSql<diesel::sql_types::Integer, DB>>::to_sql(
                    &value,
                    &mut out.reborrow(),
                )
            }
        }

        impl<DB> diesel::deserialize::FromSql<diesel::sql_types::Integer, DB> for $enum_name
        where
            DB: diesel::backend::Backend,
            i32: diesel::deserialize::FromSql<diesel::sql_types::Integer, DB>,
        {
            fn from_sql(bytes: DB::RawValue<'_>) -> diesel::deserialize::Result<Self> {
                let x =
                    <i32 as diesel::deserialize::FromSql<diesel::sql_types::Integer, DB>>::from_sql(
                        bytes,
                    )?;
                x.try_into().map_err(
                    |e: $crate::data_store::util::EnumMemberNotExistingError| e.to_string().into(),
                )
            }
        }
    };
}

pub(crate) use sql_integer_enum;
