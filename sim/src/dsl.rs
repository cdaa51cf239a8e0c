/// This macro helps defining a set of combinational units composing a CPU.
///
/// During a CPU cycle,
/// 1. The state elements (program counter, register file, data memory) hold
///    the values committed at the end of the previous cycle.
/// 2. Signals start from the state elements, go through the units in
///    dependency order, finally reaching the write ports of the state
///    elements.
/// 3. On receiving input signals, a unit computes its output signals. Units
///    hold no state, so the same inputs always give the same outputs.
/// 4. After all signals reach their destinations, the staged writes are
///    committed and the cycle ends.
///
/// For each unit `Name short { .input(..) .output(..) } { body }` the macro
/// generates `unit_in::Name`, `unit_out::Name`, the unit struct with its
/// `trigger` function, and a field `short` in the aggregate signal structs
/// [`UnitInputSignal`] and [`UnitOutputSignal`]. Inside `body` the inputs are
/// bound by value and the outputs by mutable reference.
#[macro_export]
macro_rules! define_units {
    ($(
        $(#[$att:meta])*
        $unit_name:ident $unit_short_name:ident {
            .input( $($(#[$input_att:meta])* $iname:ident : $itype:ty),* $(,)? )
            .output( $($(#[$output_att:meta])* $oname:ident : $otype:ty),* $(,)? )
        } $body:block
    )*) => {
        /// Input signals of units
        pub mod unit_in {
            #![allow(unused_imports)]
            use super::*;
            $(#[derive(Default, Debug, Clone)]
            #[cfg_attr(feature = "serde", derive(serde::Serialize))]
            pub struct $unit_name {
                $($(#[$input_att])* pub $iname: $itype, )*
            })*
        }
        /// Output signals of units
        pub mod unit_out {
            #![allow(unused_imports)]
            use super::*;
            $(#[derive(Default, Debug, Clone)]
            #[cfg_attr(feature = "serde", derive(serde::Serialize))]
            pub struct $unit_name {
                $($(#[$output_att])* pub $oname: $otype, )*
            })*
        }
        /// Input signals of all units in one cycle.
        #[derive(Default, Debug, Clone)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize))]
        pub struct UnitInputSignal {
            $(pub $unit_short_name: unit_in::$unit_name),*
        }
        /// Output signals of all units in one cycle.
        #[derive(Default, Debug, Clone)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize))]
        pub struct UnitOutputSignal {
            $(pub $unit_short_name: unit_out::$unit_name),*
        }

        /// A unit simulates a circuit in the CPU. It reads its own input
        /// signals and writes its own output signals.
        pub trait Unit {
            fn run(&self, input: &UnitInputSignal, output: &mut UnitOutputSignal);
        }

        $(
        $(#[$att])*
        #[derive(Default, Debug, Clone, Copy)]
        pub struct $unit_name {}

        impl $unit_name {
            #[allow(unused)]
            pub fn trigger(&self,
                inputs: unit_in::$unit_name,
                outputs: &mut unit_out::$unit_name,
            ) {
                let unit_in::$unit_name { $( $iname, )* } = inputs;
                let unit_out::$unit_name { $( $oname, )* } = outputs;
                $body
            }
        }

        impl Unit for $unit_name {
            fn run(&self, input: &UnitInputSignal, output: &mut UnitOutputSignal) {
                self.trigger(input.$unit_short_name.clone(), &mut output.$unit_short_name)
            }
        }
        )*

        /// All combinational units of the architecture.
        #[derive(Default, Debug, Clone, Copy)]
        pub struct Units {
            $( pub $unit_short_name: $unit_name, )*
        }
    };
}
