/*!

This is the long-form manual for `retention_core` and `retention-hub`.

## Input formats

The decode path is chosen from the name of the uploaded file:
* `.xlsx`, `.xls` (in any case) are read as workbooks
* anything else is read as comma separated values

The `retention-hub` command line accepts `--input-type csv|xlsx|xls` to force the decode path.

### Workbooks

The workbook kind is read from the content of the file: an OpenXML archive and a legacy binary
workbook are both accepted whatever their extension.

Each sheet is a table. The first row holds the column names, every following row is one record.
Empty cells, including cells holding an empty string, are left out of the record, and rows without
any filled cell are dropped. Columns with a blank header are not read at all: a value under a
blank header does not keep its row. This differs from spreadsheet exports that name such columns
`__EMPTY`, `__EMPTY_1`... Repeated column names get a suffix: `rate`, `rate_1`, `rate_2`.

The following sheets are recognized. The names are case-sensitive. Any other sheet is ignored.

| sheet                 | dataset              | columns                                                                  |
|-----------------------|----------------------|--------------------------------------------------------------------------|
| `retention_metrics`   | retention metrics    | `metric_type`, `channel`, `period`, `retention_rate`                      |
| `channel_performance` | channel performance  | `channel`, `active_workers`, `retention_rate`, `attendance_rate`, `churn_rate` |
| `churn_analysis`      | churn reasons        | `reason`, `percentage`, `count`                                           |
| `worker_journey`      | worker journey       | `stage`, `count`, `percentage`, `conversion`                              |
| `attendance_data`     | attendance           | `channel`, `attendance`, `consistency`, `absent`, `daily`, `weekly`       |
| `alerts`              | alerts               | `severity`, `title`, `description`                                        |

A missing sheet gives an empty dataset. A missing (or empty) `alerts` sheet displays three product
alerts instead, one of each severity. Only the first 5 alerts of the sheet are displayed.

Missing or malformed cells take a default: zero for numbers and counts, `Unspecified` for
channels, `Other` for churn reasons, `warning` / `Alert` / `No description available` for alerts.

### Comma separated values

The first line holds the column names. Cell values are typed from their text: numbers, `true` and
`false` are recognized, empty cells are absent. Empty lines are skipped. A line with the wrong
number of cells is an error and nothing from the file is applied.

There are no sheets in such a file, so rows are routed by their columns:
* a row with `metric_type` equal to `retention` is a retention metric
* a row with a filled `channel` is a channel performance row

A row can be both, or neither. All the other datasets are empty, including the alerts.

## Summary figures

| figure                 | workbook                                              | csv     |
|------------------------|-------------------------------------------------------|---------|
| total workers          | sum of `active_workers` over `channel_performance`    | default |
| overall retention      | mean `retention_rate` over `retention_metrics`        | default |
| churn rate             | default                                               | default |
| average tenure (days)  | default                                               | default |
| satisfaction           | default                                               | default |

The defaults are `4303`, `89.2`, `10.8`, `127` and `4.2`. They can be changed in the `summaryDefaults`
section of the configuration file. The JSON output lists, for each figure, whether it was `derived`
or is a `default`.

## Configuration file

```json
{
  "outputSettings": {
    "outputPath": "dashboard.json",
    "reportDirectory": "reports"
  },
  "dataSources": [
    { "filePath": "retention_q3.xlsx" },
    { "filePath": "export.txt", "format": "csv" }
  ],
  "summaryDefaults": {
    "totalWorkers": 4303,
    "churnRate": 10.8
  }
}
```

The paths of the data sources are relative to the directory of the configuration file. The
sources are uploaded in order: the last one that can be read is displayed.
*/
