/// The static instruction and dialect reference served by help mode.
pub const REFERENCE: &str = "\
Instructions:
  .  output the current cell and stop
  <  move left on the tape
  >  move right on the tape
  /  divide the current cell by two (modern only)
  -  decrement the current cell (pairs collate into one step)
  ,  store a random value into the current cell
  +  increment the current cell (pairs collate into one step)
  *  multiply the current cell by two (modern only)
  [  skip past the matching ] when the cell is zero (or negative when signed)
  (  like [ with marker two (modern only)
  {  like [ with marker three (modern only)
  ]  jump back behind the matching [ while the cell is nonzero
  )  like ] with marker two (modern only)
  }  like ] with marker three (modern only)

The original dialect accepts classic brainfuck: only . < > - , + [ ] are
meaningful, everything else is a comment, and brackets nest at most three
levels deep. The modern dialect pairs loops by marker instead of nesting
and rejects unknown punctuation.

Without --run the program is not executed; each instruction is listed with
its bytecode position and meaning.";
